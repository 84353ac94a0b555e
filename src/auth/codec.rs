//! Compact token encoding
//!
//! `base64url(header) "." base64url(claims) "." base64url(signature)`, unpadded.
//! Decoding splits and parses the token before any signature check so that
//! structural problems and algorithm mismatches are reported separately.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::claims::Claims;
use super::signer::{Signer, SignerError};

const TOKEN_TYPE: &str = "JWT";

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unexpected signing method: {0}")]
    UnexpectedSigningMethod(String),

    #[error("Signature is invalid")]
    SignatureInvalid,

    #[error(transparent)]
    Signing(#[from] SignerError),
}

#[derive(Serialize)]
struct Header {
    alg: Algorithm,
    typ: &'static str,
}

/// Header as read off the wire. `alg` stays a string so unknown or `none`
/// algorithms surface as a method mismatch rather than a parse failure.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

/// A token split into its parts, signature not yet checked
#[derive(Debug)]
pub struct DecodedToken {
    algorithm: String,
    claims: Claims,
    signing_input: String,
    signature: Vec<u8>,
}

impl DecodedToken {
    /// Algorithm named by the header
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Unverified claims
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Check the header algorithm against the signer, then the signature
    pub fn verify(self, signer: &dyn Signer) -> Result<Claims, CodecError> {
        let expected = signer.algorithm();
        match self.algorithm.parse::<Algorithm>() {
            Ok(alg) if alg == expected => {}
            _ => return Err(CodecError::UnexpectedSigningMethod(self.algorithm)),
        }

        if !signer.verify(self.signing_input.as_bytes(), &self.signature) {
            return Err(CodecError::SignatureInvalid);
        }

        Ok(self.claims)
    }
}

/// Serialize, sign and join `claims`
pub fn encode(claims: &Claims, signer: &dyn Signer) -> Result<String, CodecError> {
    let header = Header {
        alg: signer.algorithm(),
        typ: TOKEN_TYPE,
    };

    let header_json = serde_json::to_vec(&header)
        .map_err(|e| SignerError::SigningFailed(format!("header serialization: {}", e)))?;
    let claims_json = serde_json::to_vec(claims)
        .map_err(|e| SignerError::SigningFailed(format!("claims serialization: {}", e)))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = signer.sign(signing_input.as_bytes())?;

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Split and parse `token` without verifying it
pub fn decode(token: &str) -> Result<DecodedToken, CodecError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, claims_b64, signature_b64] = parts.as_slice() else {
        return Err(CodecError::Malformed(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    };

    let header_json = decode_segment(header_b64, "header")?;
    let claims_json = decode_segment(claims_b64, "claims")?;
    let signature = decode_segment(signature_b64, "signature")?;

    let header: RawHeader = serde_json::from_slice(&header_json)
        .map_err(|e| CodecError::Malformed(format!("header: {}", e)))?;
    let claims: Claims = serde_json::from_slice(&claims_json)
        .map_err(|e| CodecError::Malformed(format!("claims: {}", e)))?;

    Ok(DecodedToken {
        algorithm: header.alg,
        claims,
        signing_input: format!("{}.{}", header_b64, claims_b64),
        signature,
    })
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, CodecError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CodecError::Malformed(format!("{} segment: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signer::HmacSigner;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn claims() -> Claims {
        Claims::reduced(Uuid::new_v4(), Utc::now(), Duration::hours(1)).unwrap()
    }

    fn forge(header: &str, claims: &Claims, signer: &HmacSigner) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap())
        );
        let signature = signer.sign(signing_input.as_bytes()).unwrap();
        format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature))
    }

    #[test]
    fn test_header_layout() {
        let signer = HmacSigner::new(b"test-secret-key");
        let token = encode(&claims(), &signer).unwrap();

        let header = token.split('.').next().unwrap();
        let header = URL_SAFE_NO_PAD.decode(header).unwrap();
        assert_eq!(header, br#"{"alg":"HS256","typ":"JWT"}"#);
        assert!(!token.contains('='));
    }

    #[test]
    fn test_decode_then_verify() {
        let signer = HmacSigner::new(b"test-secret-key");
        let original = claims();
        let token = encode(&original, &signer).unwrap();

        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.algorithm(), "HS256");
        assert_eq!(decoded.claims(), &original);
        assert_eq!(decoded.verify(&signer).unwrap(), original);
    }

    #[test]
    fn test_wrong_segment_count() {
        for token in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(matches!(decode(token), Err(CodecError::Malformed(_))), "{token}");
        }
    }

    #[test]
    fn test_undecodable_segment() {
        let signer = HmacSigner::new(b"test-secret-key");
        let token = encode(&claims(), &signer).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "not*base64";

        assert!(matches!(
            decode(&parts.join(".")),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_unparsable_claims() {
        let token = format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode("{\"user_id\":42}"),
            URL_SAFE_NO_PAD.encode([0u8; 32])
        );
        assert!(matches!(decode(&token), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let signer = HmacSigner::new(b"test-secret-key");
        let token = forge(r#"{"alg":"none","typ":"JWT"}"#, &claims(), &signer);

        let err = decode(&token).unwrap().verify(&signer).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedSigningMethod(alg) if alg == "none"));
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let signer = HmacSigner::new(b"test-secret-key");
        let token = forge(r#"{"alg":"HS512","typ":"JWT"}"#, &claims(), &signer);

        let err = decode(&token).unwrap().verify(&signer).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedSigningMethod(_)));
    }

    #[test]
    fn test_wrong_key_signature_invalid() {
        let token = encode(&claims(), &HmacSigner::new(b"secret1")).unwrap();
        let err = decode(&token)
            .unwrap()
            .verify(&HmacSigner::new(b"secret2"))
            .unwrap_err();
        assert!(matches!(err, CodecError::SignatureInvalid));
    }
}
