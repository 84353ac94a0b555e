//! Route definitions for the auth service API

mod auth;

use axum::{routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;

use crate::handlers::health_check;
use crate::middleware::request_tracing;
use crate::state::AppState;

pub use auth::{auth_routes, protected_routes};

/// Full application router: `/health` plus the `/api/v1` API
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(protected_routes(&state));

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state);

    with_request_layers(router)
}

/// Panic recovery sits inside request tracing so a panicked request still
/// gets its 500 logged.
fn with_request_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn(request_tracing))
}
