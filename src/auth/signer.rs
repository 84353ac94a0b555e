//! HMAC signing and verification
//!
//! Signatures are computed over the signing input of a token
//! (`base64url(header) "." base64url(claims)`).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey};
use thiserror::Error;

/// Signing errors
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Produces and checks message signatures with a fixed algorithm and key
pub trait Signer: Send + Sync {
    /// Algorithm identifier written into (and expected from) token headers
    fn algorithm(&self) -> Algorithm;

    /// Sign `message`, returning raw signature bytes
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;

    /// Recompute and compare in constant time. Mismatch is `false`, never an error.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

/// HMAC-SHA256 signer over a shared secret
#[derive(Clone)]
pub struct HmacSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl HmacSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl Signer for HmacSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let encoded = crypto::sign(message, &self.encoding_key, Algorithm::HS256)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let encoded = URL_SAFE_NO_PAD.encode(signature);
        crypto::verify(&encoded, message, &self.decoding_key, Algorithm::HS256).unwrap_or(false)
    }
}
