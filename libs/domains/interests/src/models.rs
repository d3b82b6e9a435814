use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

/// Number of results returned by the similarity endpoint when `limit` is omitted.
pub const DEFAULT_LIMIT: usize = 10;

/// An interest tag as returned to clients (the stored vector is never exposed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Interest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One entry of a user's interest set as submitted by the profile editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct InterestInput {
    #[validate(
        length(min = 1, max = 128, message = "interest id must be 1-128 characters"),
        custom(function = "non_blank")
    )]
    pub id: String,

    #[validate(
        length(min = 1, max = 256, message = "interest name must be 1-256 characters"),
        custom(function = "non_blank")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

impl InterestInput {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<InterestInput> for Interest {
    fn from(input: InterestInput) -> Self {
        Self {
            id: input.id,
            name: input.name,
            description: input.description,
        }
    }
}

/// Request body of `PUT /profile/interests/{user_id}`: a bare JSON array.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(transparent)]
pub struct InterestSet {
    #[validate(nested)]
    pub interests: Vec<InterestInput>,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// A person node in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// `None` until the user is first recommended; only ever moves forward.
    pub last_recommended_at: Option<DateTime<Utc>>,
}

impl User {
    /// Minimal record used when a user is first seen.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: format!("User {id}"),
            email: String::new(),
            id,
            last_recommended_at: None,
        }
    }
}

/// Optional profile fields accepted by `POST /profile/{user_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    /// Empty means "no email"; anything else must be an address.
    #[validate(custom(function = "email_or_empty"))]
    pub email: Option<String>,
}

fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("must be a valid email address".into());
    Err(err)
}

/// Outcome of an idempotent profile creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCreation {
    Created,
    AlreadyExists,
}

impl UserCreation {
    pub fn message(&self) -> &'static str {
        match self {
            UserCreation::Created => "User created successfully",
            UserCreation::AlreadyExists => "User already exists",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An interest with a stored vector, as handed to the similarity ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCandidate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SimilarInterest {
    pub interest_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Cosine similarity to the source interest, strictly above the configured threshold.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchedInterest {
    pub interest_id: String,
    pub interest_name: String,
}

/// A user returned by the store for a set of interests, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUser {
    pub user_id: String,
    pub user_name: String,
    pub interests: Vec<MatchedInterest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendedUser {
    pub user_id: String,
    pub user_name: String,
    /// Sum of the similarities of the matched interests.
    pub score: f64,
    pub matched_interests: Vec<MatchedInterest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub similar_interests: Vec<SimilarInterest>,
    pub recommended_users: Vec<RecommendedUser>,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

impl Recommendation {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            similar_interests: Vec::new(),
            recommended_users: Vec::new(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SimilarQuery {
    /// Maximum number of similar interests and of recommended users (default 10)
    pub limit: Option<usize>,
}
