//! Authentication module
//!
//! Stateless token authentication:
//! - HMAC-SHA256 signing over a shared secret
//! - Compact three-part token encoding
//! - Access/refresh token issuance, validation and refresh
//! - bcrypt password hashing for the login flow

mod claims;
mod clock;
mod codec;
mod password;
mod service;
mod signer;

pub use claims::{Claims, UserIdentity, ISSUER};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode, encode, CodecError, DecodedToken};
pub use password::{decoy_digest, hash_password, verify_password, PasswordError};
pub use service::{
    InvalidTokenReason, TokenError, TokenService, TokenServiceConfig,
    DEFAULT_ACCESS_TOKEN_LIFETIME_HOURS, REFRESH_TOKEN_LIFETIME_DAYS,
};
pub use signer::{HmacSigner, Signer, SignerError};
