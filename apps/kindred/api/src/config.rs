use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_or_default, neo4j::Neo4jConfig,
    server::ServerConfig,
};
use domain_interests::{EmbeddingConfig, EngineSettings};
use std::str::FromStr;

pub use core_config::Environment;

/// Which repository implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Neo4j,
    /// Process-local graph; contents are lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neo4j" => Ok(StoreBackend::Neo4j),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::ParseError {
                key: "STORE_BACKEND".to_string(),
                details: format!("expected 'neo4j' or 'memory', got '{other}'"),
            }),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `core_config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub store: StoreBackend,
    pub neo4j: Neo4jConfig,
    pub engine: EngineSettings,
    pub embedding: EmbeddingConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let store: StoreBackend = env_or_default("STORE_BACKEND", "neo4j").parse()?;
        let neo4j = Neo4jConfig::from_env()?;
        let engine = EngineSettings::from_env()?;
        let embedding = EmbeddingConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            store,
            neo4j,
            engine,
            embedding,
            environment,
        })
    }
}
