//! Authentication routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
}

/// Routes behind the bearer-token gate
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(auth::get_profile))
        .route("/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.token_service.clone(),
            require_auth,
        ))
}
