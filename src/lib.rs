//! Auth Service Library
//!
//! Stateless token authentication: signed access/refresh token issuance and
//! validation, plus the bearer-token gate and HTTP surface built on it.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
