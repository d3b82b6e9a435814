//! Readiness check against the configured graph store.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_interests::InterestRepository;

/// Readiness check endpoint: 200 when the store answers a ping, 503 otherwise.
pub async fn ready_handler<R: InterestRepository>(State(state): State<AppState<R>>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "graph",
        Box::pin(async {
            state
                .service
                .ping()
                .await
                .map_err(|e| format!("Graph store ping failed: {}", e))
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
