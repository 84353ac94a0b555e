//! Token service
//!
//! Issues access and refresh tokens and validates incoming ones. Holds the
//! only copy of the signing secret and the access-token lifetime.

use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::claims::{Claims, UserIdentity};
use super::clock::{Clock, SystemClock};
use super::codec::{self, CodecError};
use super::signer::{HmacSigner, Signer};

/// Lifetime of refresh tokens
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

/// Default lifetime of access tokens
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Why a token was rejected. Only for logs; clients see a uniform error.
#[derive(Error, Debug)]
pub enum InvalidTokenReason {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("unexpected signing method: {0}")]
    UnexpectedSigningMethod(String),

    #[error("signature is invalid")]
    SignatureInvalid,

    #[error("token is expired or not yet valid")]
    ExpiredOrNotYetValid,
}

/// Token service errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidToken(#[source] InvalidTokenReason),

    #[error("Token subject no longer exists")]
    UnknownSubject,

    /// Signing with a well-formed key failed. Indicates an environment defect.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Configured lifetime pushes the expiry past the representable range
    #[error("Token expiry is out of range")]
    ExpiryOutOfRange,
}

impl TokenError {
    /// Rejection reason, if this is an invalid-token error
    pub fn reason(&self) -> Option<&InvalidTokenReason> {
        match self {
            TokenError::InvalidToken(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<CodecError> for TokenError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Malformed(msg) => {
                TokenError::InvalidToken(InvalidTokenReason::Malformed(msg))
            }
            CodecError::UnexpectedSigningMethod(alg) => {
                TokenError::InvalidToken(InvalidTokenReason::UnexpectedSigningMethod(alg))
            }
            CodecError::SignatureInvalid => {
                TokenError::InvalidToken(InvalidTokenReason::SignatureInvalid)
            }
            CodecError::Signing(e) => TokenError::Signing(e.to_string()),
        }
    }
}

/// Process-wide token settings, fixed at startup
#[derive(Clone)]
pub struct TokenServiceConfig {
    pub secret_key: Vec<u8>,
    pub access_token_lifetime: Duration,
}

impl TokenServiceConfig {
    pub fn new(secret_key: impl Into<Vec<u8>>, access_token_lifetime: Duration) -> Self {
        Self {
            secret_key: secret_key.into(),
            access_token_lifetime,
        }
    }
}

impl std::fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("secret_key", &"****")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .finish()
    }
}

/// Issues and validates signed tokens
#[derive(Clone)]
pub struct TokenService {
    signer: Arc<dyn Signer>,
    clock: Arc<dyn Clock>,
    access_token_lifetime: Duration,
}

impl TokenService {
    /// Create a TokenService using the system clock
    pub fn new(config: TokenServiceConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a TokenService with an injected clock
    pub fn with_clock(config: TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            signer: Arc::new(HmacSigner::new(&config.secret_key)),
            clock,
            access_token_lifetime: config.access_token_lifetime,
        }
    }

    pub fn access_token_lifetime(&self) -> Duration {
        self.access_token_lifetime
    }

    /// Issue an access token carrying the full identity
    pub fn issue_access_token(&self, identity: &UserIdentity) -> Result<String, TokenError> {
        let claims = Claims::full(identity, self.clock.now(), self.access_token_lifetime)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        self.sign(&claims)
    }

    /// Issue a refresh token carrying only the subject
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let claims = Claims::reduced(
            user_id,
            self.clock.now(),
            Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
        )
        .ok_or(TokenError::ExpiryOutOfRange)?;
        self.sign(&claims)
    }

    /// Decode, verify and check the validity window of `token`
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = codec::decode(token)?.verify(self.signer.as_ref())?;

        if !claims.is_valid_at(self.clock.now()) {
            return Err(TokenError::InvalidToken(
                InvalidTokenReason::ExpiredOrNotYetValid,
            ));
        }

        Ok(claims)
    }

    /// Exchange a refresh token for an access token built from the subject alone.
    /// Email and username are not recoverable here; see [`TokenService::refresh_with`].
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.validate(refresh_token)?;
        let claims = Claims::reduced(
            claims.subject(),
            self.clock.now(),
            self.access_token_lifetime,
        )
        .ok_or(TokenError::ExpiryOutOfRange)?;
        self.sign(&claims)
    }

    /// Exchange a refresh token for a full access token, re-fetching the
    /// identity through `lookup`
    pub fn refresh_with<F>(&self, refresh_token: &str, lookup: F) -> Result<String, TokenError>
    where
        F: FnOnce(Uuid) -> Option<UserIdentity>,
    {
        let claims = self.validate(refresh_token)?;
        let identity = lookup(claims.subject()).ok_or(TokenError::UnknownSubject)?;
        self.issue_access_token(&identity)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let token = codec::encode(claims, self.signer.as_ref())?;
        Ok(token)
    }
}
