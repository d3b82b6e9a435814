//! Type-safe error codes for API responses.
//!
//! Each code carries a client-facing identifier, an integer for logs and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid JSON format in request body
    InvalidJson,

    /// Requested resource was not found
    NotFound,

    /// Request conflicts with current resource state
    Conflict,

    /// Request payload is semantically incorrect
    UnprocessableEntity,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Store errors (2000-2999)
    /// The backing graph store rejected or failed a call
    StoreError,

    /// A multi-step write stopped half way; retrying the request converges
    PartialWrite,

    // Embedding errors (3000-3999)
    /// The embedding provider failed to vectorize text
    EmbeddingError,

    // I/O errors (4000s)
    /// File system I/O error
    IoError,

    // JSON parsing errors (5000s)
    /// JSON serialization/deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::StoreError => "STORE_ERROR",
            Self::PartialWrite => "PARTIAL_WRITE",
            Self::EmbeddingError => "EMBEDDING_ERROR",
            Self::IoError => "IO_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Integer code used in structured logs.
    ///
    /// Ranges:
    /// - 1000-1999: Client errors
    /// - 2000-2999: Store errors
    /// - 3000-3999: Embedding errors
    /// - 4000-4999: I/O errors
    /// - 5000-5999: Serialization errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Conflict => 1008,
            Self::UnprocessableEntity => 1009,
            Self::InvalidJson => 1010,
            Self::ServiceUnavailable => 1011,

            Self::StoreError => 2001,
            Self::PartialWrite => 2002,

            Self::EmbeddingError => 3001,

            Self::IoError => 4001,

            Self::SerdeJsonError => 5001,
        }
    }

    /// Default user-facing message; handlers may override it with specifics.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidJson => "Invalid JSON format",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::UnprocessableEntity => "Request cannot be processed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::StoreError => "The graph store could not complete the request",
            Self::PartialWrite => "The update was only partially applied; retry the request",
            Self::EmbeddingError => "Failed to compute an embedding",
            Self::IoError => "I/O error occurred",
            Self::SerdeJsonError => "JSON serialization error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
