use axum::http::{HeaderValue, Method};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Creates a CORS layer restricted to the given origins.
///
/// Methods are limited to what the profile and interest routes use
/// (GET, POST, PUT, OPTIONS) and responses are cached by browsers for an hour.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer that accepts any origin.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Parses a comma-separated origin list such as
/// `http://localhost:5173,https://kindred.example.com`.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(origins)
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// The browser frontend and the API are served from different origins, so an
/// unset variable falls back to the permissive layer instead of failing startup.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    match std::env::var("CORS_ALLOWED_ORIGIN") {
        Ok(raw) => {
            let origins = parse_allowed_origins(&raw)?;
            info!("CORS configured with allowed origins: {}", raw);
            Ok(create_cors_layer(origins))
        }
        Err(_) => {
            warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
            Ok(create_permissive_cors_layer())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins_trims_and_skips_blanks() {
        let origins =
            parse_allowed_origins(" http://localhost:5173 , ,https://kindred.example.com").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:5173");
    }

    #[test]
    fn test_parse_allowed_origins_rejects_empty() {
        let err = parse_allowed_origins(" , ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_cors_layer_from_env_without_variable() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(cors_layer_from_env().is_ok());
        });
    }

    #[test]
    fn test_cors_layer_from_env_with_invalid_origin() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some("bad\norigin"), || {
            assert!(cors_layer_from_env().is_err());
        });
    }
}
