//! Thin HTTP transport over [`JobDispatcher`](crate::core::dispatcher::JobDispatcher).

pub mod health;
pub mod process;

use axum::Router;

use crate::core::dispatcher::JobDispatcher;

pub use health::health_routes;
pub use process::{process_routes, status_for};

/// Shared handler state. Cloned per request; the engine behind it is shared.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: JobDispatcher,
}

impl AppState {
    pub fn new(dispatcher: JobDispatcher) -> Self {
        Self { dispatcher }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(process_routes())
        .with_state(state)
}
