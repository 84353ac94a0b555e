//! Application state shared across handlers

use std::sync::Arc;

use crate::auth::{decoy_digest, PasswordError, TokenService};
use crate::store::UserStore;

use axum::extract::FromRef;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<TokenService>,
    pub user_store: Arc<dyn UserStore>,
    /// bcrypt cost for passwords hashed at registration
    pub bcrypt_cost: u32,
    /// Digest checked on logins for unknown emails, so they pay the same bcrypt cost
    pub decoy_digest: Arc<str>,
}

impl AppState {
    pub fn new(
        token_service: Arc<TokenService>,
        user_store: Arc<dyn UserStore>,
        bcrypt_cost: u32,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            token_service,
            user_store,
            bcrypt_cost,
            decoy_digest: decoy_digest(bcrypt_cost)?.into(),
        })
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.token_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.user_store.clone()
    }
}
