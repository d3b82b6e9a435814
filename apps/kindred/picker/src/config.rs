//! Configuration for the picker

use core_config::{ConfigError, Environment, FromEnv, env_or_default, neo4j::Neo4jConfig};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Base URL of the kindred API, including the `/api` prefix
    pub api_url: String,
    pub neo4j: Neo4jConfig,
}

impl FromEnv for Config {
    /// - KINDRED_API_URL: defaults to http://localhost:8080/api
    /// - NEO4J_*: see [`Neo4jConfig`]
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = env_or_default("KINDRED_API_URL", DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            environment: Environment::from_env(),
            api_url,
            neo4j: Neo4jConfig::from_env()?,
        })
    }
}
