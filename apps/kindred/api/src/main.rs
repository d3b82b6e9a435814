use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_interests::{
    InMemoryInterestRepository, InterestRepository, InterestService, Neo4jInterestRepository,
    build_provider,
};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, StoreBackend};
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    match config.store {
        StoreBackend::Neo4j => {
            info!("Connecting to Neo4j at {}", config.neo4j.uri);
            let repository = Neo4jInterestRepository::connect(&config.neo4j)
                .await
                .map_err(|e| eyre::eyre!("Neo4j connection failed: {}", e))?;
            repository
                .ensure_schema()
                .await
                .map_err(|e| eyre::eyre!("Neo4j schema setup failed: {}", e))?;
            serve(config, repository).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            serve(config, InMemoryInterestRepository::new()).await
        }
    }
}

async fn serve<R: InterestRepository + 'static>(config: Config, repository: R) -> eyre::Result<()> {
    let embedder = build_provider(&config.embedding);
    info!(
        provider = embedder.name(),
        dimension = embedder.dimension(),
        strategy = ?config.engine.strategy,
        "Embedding provider ready"
    );

    let service = InterestService::new(repository, embedder, config.engine.clone());
    let state = AppState::new(config, service);

    // Build router with API routes
    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // - /health: liveness check with app name/version
    // - /ready: readiness check that pings the graph store
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting kindred API with graceful shutdown (30s timeout)");

    let server_config = state.config.server.clone();
    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30), // 30s graceful shutdown timeout
        async move {
            // Graph connections close when the last service handle is dropped
            drop(state);
            info!("Graph store connections released");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Kindred API shutdown complete");
    Ok(())
}
