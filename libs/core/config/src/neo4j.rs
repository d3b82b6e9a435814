use crate::{ConfigError, FromEnv, env_or_default, env_parse_or};

/// Connection settings for the Neo4j graph holding users, interests and their edges.
#[derive(Clone, Debug)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: usize,
}

impl Neo4jConfig {
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            max_connections: 16,
        }
    }
}

impl FromEnv for Neo4jConfig {
    /// - NEO4J_URI: defaults to bolt://localhost:7687
    /// - NEO4J_USER: defaults to neo4j
    /// - NEO4J_PASSWORD: defaults to password
    /// - NEO4J_MAX_CONNECTIONS: defaults to 16
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uri: env_or_default("NEO4J_URI", "bolt://localhost:7687"),
            user: env_or_default("NEO4J_USER", "neo4j"),
            password: env_or_default("NEO4J_PASSWORD", "password"),
            max_connections: env_parse_or("NEO4J_MAX_CONNECTIONS", 16usize)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neo4j_config_defaults() {
        temp_env::with_vars(
            [
                ("NEO4J_URI", None::<&str>),
                ("NEO4J_USER", None::<&str>),
                ("NEO4J_PASSWORD", None::<&str>),
                ("NEO4J_MAX_CONNECTIONS", None::<&str>),
            ],
            || {
                let config = Neo4jConfig::from_env().unwrap();
                assert_eq!(config.uri, "bolt://localhost:7687");
                assert_eq!(config.user, "neo4j");
                assert_eq!(config.password, "password");
                assert_eq!(config.max_connections, 16);
            },
        );
    }

    #[test]
    fn test_neo4j_config_overrides() {
        temp_env::with_vars(
            [
                ("NEO4J_URI", Some("bolt://graph:7687")),
                ("NEO4J_USER", Some("kindred")),
                ("NEO4J_MAX_CONNECTIONS", Some("4")),
            ],
            || {
                let config = Neo4jConfig::from_env().unwrap();
                assert_eq!(config.uri, "bolt://graph:7687");
                assert_eq!(config.user, "kindred");
                assert_eq!(config.max_connections, 4);
            },
        );
    }

    #[test]
    fn test_neo4j_config_invalid_pool_size() {
        temp_env::with_var("NEO4J_MAX_CONNECTIONS", Some("-1"), || {
            let err = Neo4jConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("NEO4J_MAX_CONNECTIONS"));
        });
    }
}
