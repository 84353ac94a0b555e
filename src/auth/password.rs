//! Password hashing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),
}

/// Hash `password` with bcrypt at `cost`
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// Digest of a throwaway password at `cost`. Verifying against it costs the
/// same as verifying against a stored digest of that cost.
pub fn decoy_digest(cost: u32) -> Result<String, PasswordError> {
    hash_password("decoy-password-never-matches", cost)
}

/// Check `password` against a bcrypt digest. A malformed digest never matches.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match bcrypt::verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password digest could not be parsed");
            false
        }
    }
}
