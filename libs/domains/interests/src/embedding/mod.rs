//! Text-to-vector embedding providers.
//!
//! [`build_provider`] picks an implementation from [`EmbeddingConfig`]. When the
//! configured model cannot be loaded it logs a warning and falls back to
//! [`ZeroEmbeddingProvider`], keeping the service up with similarity disabled.

mod openai;
mod provider;
mod word_vectors;
mod zero;

pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;
#[cfg(test)]
pub use provider::MockEmbeddingProvider;
pub use word_vectors::WordVectorProvider;
pub use zero::ZeroEmbeddingProvider;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_DIMENSION: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingConfig {
    WordVectors {
        path: PathBuf,
        /// Width of the fallback vectors when the file cannot be loaded.
        dimension: usize,
    },
    OpenAI {
        api_key: Option<String>,
        base_url: String,
        model: String,
        dimension: usize,
    },
    None { dimension: usize },
}

impl FromEnv for EmbeddingConfig {
    /// - EMBEDDING_PROVIDER: word-vectors | openai | none (default: word-vectors when
    ///   WORD_VECTORS_PATH is set, none otherwise)
    /// - WORD_VECTORS_PATH: GloVe / word2vec text file
    /// - EMBEDDING_DIMENSION: defaults to 100
    /// - OPENAI_API_KEY, OPENAI_BASE_URL, OPENAI_EMBEDDING_MODEL
    fn from_env() -> Result<Self, ConfigError> {
        let dimension = env_parse_or("EMBEDDING_DIMENSION", DEFAULT_DIMENSION)?;
        let path = std::env::var("WORD_VECTORS_PATH").ok();
        let default_provider = if path.is_some() { "word-vectors" } else { "none" };

        match env_or_default("EMBEDDING_PROVIDER", default_provider)
            .trim()
            .to_lowercase()
            .as_str()
        {
            "word-vectors" | "word_vectors" | "glove" => {
                let path = path.ok_or_else(|| {
                    ConfigError::MissingEnvVar("WORD_VECTORS_PATH".to_string())
                })?;
                Ok(EmbeddingConfig::WordVectors {
                    path: path.into(),
                    dimension,
                })
            }
            "openai" => Ok(EmbeddingConfig::OpenAI {
                api_key: std::env::var("OPENAI_API_KEY").ok(),
                base_url: env_or_default("OPENAI_BASE_URL", openai::DEFAULT_OPENAI_BASE_URL),
                model: env_or_default("OPENAI_EMBEDDING_MODEL", openai::DEFAULT_OPENAI_MODEL),
                dimension,
            }),
            "none" => Ok(EmbeddingConfig::None { dimension }),
            other => Err(ConfigError::ParseError {
                key: "EMBEDDING_PROVIDER".to_string(),
                details: format!("unknown provider '{other}'"),
            }),
        }
    }
}

/// Builds the configured provider, falling back to zero vectors on failure.
pub fn build_provider(config: &EmbeddingConfig) -> Arc<dyn EmbeddingProvider> {
    match config {
        EmbeddingConfig::WordVectors { path, dimension } => match WordVectorProvider::load(path) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Word vectors unavailable, falling back to zero embeddings"
                );
                Arc::new(ZeroEmbeddingProvider::new(*dimension))
            }
        },
        EmbeddingConfig::OpenAI {
            api_key,
            base_url,
            model,
            dimension,
        } => match api_key {
            Some(key) => Arc::new(OpenAIProvider::new(
                OpenAIConfig::new(key.clone(), *dimension)
                    .with_base_url(base_url.clone())
                    .with_model(model.clone()),
            )),
            None => {
                tracing::warn!("OPENAI_API_KEY not set, falling back to zero embeddings");
                Arc::new(ZeroEmbeddingProvider::new(*dimension))
            }
        },
        EmbeddingConfig::None { dimension } => {
            tracing::warn!("No embedding model configured, similarity search will return nothing");
            Arc::new(ZeroEmbeddingProvider::new(*dimension))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 6] = [
        "EMBEDDING_PROVIDER",
        "WORD_VECTORS_PATH",
        "EMBEDDING_DIMENSION",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "OPENAI_EMBEDDING_MODEL",
    ];

    #[test]
    fn test_defaults_to_none_without_vectors() {
        temp_env::with_vars(KEYS.map(|k| (k, None::<&str>)), || {
            assert_eq!(
                EmbeddingConfig::from_env().unwrap(),
                EmbeddingConfig::None { dimension: 100 }
            );
        });
    }

    #[test]
    fn test_word_vectors_inferred_from_path() {
        temp_env::with_vars(
            [
                ("EMBEDDING_PROVIDER", None),
                ("WORD_VECTORS_PATH", Some("/data/glove.100d.txt")),
                ("EMBEDDING_DIMENSION", None),
            ],
            || {
                assert_eq!(
                    EmbeddingConfig::from_env().unwrap(),
                    EmbeddingConfig::WordVectors {
                        path: PathBuf::from("/data/glove.100d.txt"),
                        dimension: DEFAULT_DIMENSION,
                    }
                );
            },
        );
    }

    #[test]
    fn test_word_vectors_require_path() {
        temp_env::with_vars(
            [
                ("EMBEDDING_PROVIDER", Some("word-vectors")),
                ("WORD_VECTORS_PATH", None),
            ],
            || {
                let err = EmbeddingConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("WORD_VECTORS_PATH"));
            },
        );
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        temp_env::with_var("EMBEDDING_PROVIDER", Some("bert"), || {
            assert!(EmbeddingConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_missing_word_vectors_fall_back_to_zero() {
        let provider = build_provider(&EmbeddingConfig::WordVectors {
            path: PathBuf::from("/nonexistent/vectors.txt"),
            dimension: DEFAULT_DIMENSION,
        });
        assert_eq!(provider.name(), "none");
        assert_eq!(provider.dimension(), DEFAULT_DIMENSION);
    }

    #[test]
    fn test_word_vector_fallback_uses_configured_dimension() {
        temp_env::with_vars(
            [
                ("EMBEDDING_PROVIDER", Some("word-vectors")),
                ("WORD_VECTORS_PATH", Some("/nonexistent/vectors.txt")),
                ("EMBEDDING_DIMENSION", Some("25")),
            ],
            || {
                let config = EmbeddingConfig::from_env().unwrap();
                let provider = build_provider(&config);

                assert_eq!(provider.name(), "none");
                assert_eq!(provider.dimension(), 25);
            },
        );
    }

    #[test]
    fn test_openai_without_key_falls_back_to_zero() {
        let provider = build_provider(&EmbeddingConfig::OpenAI {
            api_key: None,
            base_url: openai::DEFAULT_OPENAI_BASE_URL.to_string(),
            model: openai::DEFAULT_OPENAI_MODEL.to_string(),
            dimension: 64,
        });
        assert_eq!(provider.name(), "none");
        assert_eq!(provider.dimension(), 64);
    }
}
