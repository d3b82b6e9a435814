use axum::Router;
use domain_interests::InterestRepository;

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes<R: InterestRepository + 'static>(state: &crate::state::AppState<R>) -> Router {
    domain_interests::handlers::router_with_shared(state.service.clone())
}

/// Creates a router with the /ready endpoint that pings the graph store.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router<R: InterestRepository + 'static>(state: crate::state::AppState<R>) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler::<R>))
        .with_state(state)
}
