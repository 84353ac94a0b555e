//! Configuration management for the auth service
//!
//! This module handles loading and validating configuration from environment variables,
//! with support for different environments (development, staging, production).

use chrono::Duration;
use std::env;
use thiserror::Error;

use crate::auth::{TokenServiceConfig, DEFAULT_ACCESS_TOKEN_LIFETIME_HOURS};

const DEVELOPMENT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Upper bound for `JWT_EXPIRY_HOURS` (one year)
const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 366;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Shared secret for token signing
    pub jwt_secret: String,

    /// Access token lifetime in hours (default: 24)
    pub jwt_expiry_hours: i64,

    /// bcrypt cost for new password hashes
    pub bcrypt_cost: u32,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = var("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let log_level = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()))
            }
            None => DEVELOPMENT_JWT_SECRET.to_string(),
        };

        let jwt_expiry_hours = match var("JWT_EXPIRY_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| (1..=MAX_JWT_EXPIRY_HOURS).contains(hours))
                .ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "JWT_EXPIRY_HOURS must be an integer between 1 and {}, got '{}'",
                        MAX_JWT_EXPIRY_HOURS, raw
                    ))
                })?,
            None => DEFAULT_ACCESS_TOKEN_LIFETIME_HOURS,
        };

        let bcrypt_cost = var("BCRYPT_COST")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS");

        Ok(Config {
            environment,
            port,
            log_level,
            jwt_secret,
            jwt_expiry_hours,
            bcrypt_cost,
            cors_allowed_origins,
        })
    }

    /// Token settings derived from this configuration
    pub fn token_service_config(&self) -> TokenServiceConfig {
        TokenServiceConfig::new(
            self.jwt_secret.as_bytes(),
            Duration::hours(self.jwt_expiry_hours),
        )
    }

    /// Whether the development fallback secret is in use
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"****")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("dev").unwrap(), Environment::Development);
        assert_eq!(
            Environment::parse("development").unwrap(),
            Environment::Development
        );
        assert_eq!(Environment::parse("staging").unwrap(), Environment::Staging);
        assert_eq!(Environment::parse("prod").unwrap(), Environment::Production);

        // Case insensitive
        assert_eq!(Environment::parse("PROD").unwrap(), Environment::Production);

        // Invalid
        assert!(Environment::parse("invalid").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.uses_default_secret());
        assert_eq!(
            config.token_service_config().access_token_lifetime,
            Duration::hours(24)
        );
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("PORT", "3001"),
            ("JWT_SECRET", "s3cr3t"),
            ("JWT_EXPIRY_HOURS", "2"),
            ("BCRYPT_COST", "4"),
        ])
        .unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.bcrypt_cost, 4);
        assert!(!config.uses_default_secret());

        let token_config = config.token_service_config();
        assert_eq!(token_config.secret_key, b"s3cr3t".to_vec());
        assert_eq!(token_config.access_token_lifetime, Duration::hours(2));
    }

    #[test]
    fn test_production_requires_secret() {
        let err = config_from(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        assert!(config_from(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "x")]).is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            config_from(&[("JWT_EXPIRY_HOURS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            config_from(&[("JWT_EXPIRY_HOURS", "soon")]),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_expiry_hours_upper_bound() {
        assert!(matches!(
            config_from(&[("JWT_EXPIRY_HOURS", "100000000000")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            config_from(&[("JWT_EXPIRY_HOURS", "8785")]),
            Err(ConfigError::InvalidValue(_))
        ));

        let config = config_from(&[("JWT_EXPIRY_HOURS", "8784")]).unwrap();
        assert_eq!(
            config.token_service_config().access_token_lifetime,
            Duration::hours(8784)
        );
    }

    #[test]
    fn test_debug_masks_secret() {
        let config = config_from(&[("JWT_SECRET", "s3cr3t")]).unwrap();
        assert!(!format!("{:?}", config).contains("s3cr3t"));
    }
}
