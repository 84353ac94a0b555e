//! Authentication HTTP handlers
//!
//! Registration, credential login, token refresh and the protected
//! profile/logout endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{hash_password, verify_password, TokenError};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::models::{
    ApiResponse, LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse,
    RegisterRequest, User, UserResponse,
};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// POST /auth/register - Create a user with a bcrypt-hashed password
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let Json(req) = payload?;
    req.validate()?;

    let cost = state.bcrypt_cost;
    let password = req.password;
    let password_hash =
        tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

    let now = Utc::now();
    let user = state.user_store.insert(User {
        id: Uuid::new_v4(),
        email: req.email,
        username: req.username,
        password_hash,
        first_name: req.first_name,
        last_name: req.last_name,
        is_active: true,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        username = %user.username,
        "User registered successfully"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User registered successfully",
            user.into(),
        )),
    ))
}

/// POST /auth/login - Check credentials and issue an access/refresh token pair
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let Json(req) = payload?;
    req.validate()?;

    // Unknown emails are checked against the decoy so both paths pay for bcrypt
    let user = state.user_store.find_by_email(&req.email);
    let password = req.password;
    let digest = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.decoy_digest.to_string(),
    };
    let password_ok =
        tokio::task::spawn_blocking(move || verify_password(&password, &digest)).await?;

    let Some(user) = user else {
        tracing::warn!(email = %req.email, "Login attempt for unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };
    if !password_ok {
        tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Login attempt for inactive user");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = &state.token_service;
    let access_token = tokens.issue_access_token(&user.identity())?;
    let refresh_token = tokens.issue_refresh_token(user.id)?;

    tracing::info!(user_id = %user.id, email = %user.email, "User logged in successfully");

    Ok(Json(ApiResponse::success(
        "Login successful",
        LoginResponse {
            user: user.into(),
            access_token,
            refresh_token,
            expires_in: tokens.access_token_lifetime().num_seconds(),
        },
    )))
}

/// POST /auth/refresh - Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<RefreshTokenResponse>>> {
    let Json(req) = payload?;
    req.validate()?;

    let store = &state.user_store;
    let access_token = state
        .token_service
        .refresh_with(&req.refresh_token, |user_id| {
            store
                .find_by_id(user_id)
                .filter(|user| user.is_active)
                .map(|user| user.identity())
        })
        .map_err(|e| match e {
            TokenError::Signing(_) | TokenError::ExpiryOutOfRange => ApiError::from(e),
            _ => {
                tracing::warn!(error = %e, reason = ?e.reason(), "Invalid refresh token");
                ApiError::Unauthorized("Invalid or expired refresh token".to_string())
            }
        })?;

    tracing::info!("Token refreshed successfully");

    Ok(Json(ApiResponse::success(
        "Token refreshed successfully",
        RefreshTokenResponse {
            access_token,
            expires_in: state.token_service.access_token_lifetime().num_seconds(),
        },
    )))
}

/// GET /profile - Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let profile = state
        .user_store
        .find_by_id(user.user_id)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::success(
        "Profile retrieved successfully",
        profile.into(),
    )))
}

/// POST /logout - Tokens are stateless; nothing to invalidate server-side
pub async fn logout(user: AuthenticatedUser) -> Json<ApiResponse<()>> {
    tracing::info!(user_id = %user.user_id, "User logged out");

    Json(ApiResponse::message("Logged out successfully"))
}
