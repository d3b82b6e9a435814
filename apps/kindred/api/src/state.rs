//! Application state shared by the ready handler and the domain router.

use domain_interests::{InterestRepository, InterestService};
use std::sync::Arc;

/// Shared application state.
///
/// Generic over the repository so the same wiring serves both store backends.
pub struct AppState<R: InterestRepository> {
    /// Application configuration loaded from environment variables
    pub config: Arc<crate::config::Config>,
    pub service: Arc<InterestService<R>>,
}

// Manual impl: cloning the state never needs `R: Clone`.
impl<R: InterestRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            service: Arc::clone(&self.service),
        }
    }
}

impl<R: InterestRepository> AppState<R> {
    pub fn new(config: crate::config::Config, service: InterestService<R>) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
        }
    }
}
