//! Middleware for the auth service API
//!
//! This module provides middleware for request tracing and authentication.

pub mod auth;
mod tracing;

pub use auth::{authorize, require_auth, AuthError, AuthenticatedUser};
pub use self::tracing::request_tracing;
