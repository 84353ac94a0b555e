//! Token claims and the identity they carry

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into every token
pub const ISSUER: &str = "auth-service";

/// Identity handed to the token layer by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Claims carried in access and refresh tokens
///
/// Field order matches the serialized layout on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub user_id: Uuid,
    /// Empty in refresh tokens
    #[serde(default)]
    pub email: String,
    /// Empty in refresh tokens
    #[serde(default)]
    pub username: String,
    /// Issuer
    pub iss: String,
    /// Subject (user ID, hyphenated)
    pub sub: String,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Full claims for an access token valid from `now` for `lifetime`.
    /// `None` if the expiry falls outside the representable time range.
    pub fn full(
        identity: &UserIdentity,
        now: DateTime<Utc>,
        lifetime: chrono::Duration,
    ) -> Option<Self> {
        Some(Self {
            user_id: identity.id,
            email: identity.email.clone(),
            username: identity.username.clone(),
            ..Self::reduced(identity.id, now, lifetime)?
        })
    }

    /// Subject-only claims, used for refresh tokens
    pub fn reduced(user_id: Uuid, now: DateTime<Utc>, lifetime: chrono::Duration) -> Option<Self> {
        let iat = now.timestamp();
        let exp = now.checked_add_signed(lifetime)?.timestamp();
        Some(Self {
            user_id,
            email: String::new(),
            username: String::new(),
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            exp,
            nbf: iat,
            iat,
        })
    }

    pub fn subject(&self) -> Uuid {
        self.user_id
    }

    /// Whether `now` lies within `[nbf, exp]`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.nbf <= now && now <= self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.user_id,
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}
