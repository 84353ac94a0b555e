//! Authentication middleware
//!
//! Gates requests on a bearer access token and exposes the caller's identity
//! to handlers as a typed request extension.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Claims, TokenService, UserIdentity};
use crate::models::ApiResponse;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated user extracted from an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.user_id,
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            username: claims.username,
        }
    }
}

/// Reasons a request is refused by the gate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    BadScheme,

    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::failure(self.to_string(), None)),
        )
            .into_response()
    }
}

/// Authorize a request from its headers
pub fn authorize(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<AuthenticatedUser, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::BadScheme)?;

    let claims = tokens.validate(token).map_err(|e| {
        match e.reason() {
            Some(reason) => tracing::warn!(reason = %reason, "Invalid token"),
            None => tracing::warn!(error = %e, "Invalid token"),
        }
        AuthError::InvalidToken
    })?;

    Ok(claims.into())
}

/// Middleware rejecting unauthenticated requests with 401.
/// On success the [`AuthenticatedUser`] is stored in request extensions.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(request.headers(), &tokens) {
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                reason = %e,
                path = %request.uri().path(),
                "Request rejected"
            );
            e.into_response()
        }
    }
}

/// Extractor for authenticated users
///
/// Reads the identity stored by [`require_auth`], or authorizes the request
/// itself when the middleware is not installed on the route.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, user {}", user.user_id)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let tokens = Arc::<TokenService>::from_ref(state);
        let user = authorize(&parts.headers, &tokens)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
