//! Webhook signature verification.
//!
//! Validates the `X-Hub-Signature-256` header GitHub attaches to webhook
//! deliveries: HMAC-SHA256 over the exact raw body bytes, compared in
//! constant time. Verification happens before any payload decoding so no
//! attacker-controlled JSON is parsed under an unauthenticated context.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

const SCHEME_PREFIX: &str = "sha256=";

/// Verifies webhook payloads against the shared webhook secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    /// Create a verifier for the given shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify a claimed signature against the raw payload bytes.
    ///
    /// # Arguments
    ///
    /// * `payload` - The raw request body, exactly as received
    /// * `signature` - The header value, format `sha256=<hex>`
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Signature matches
    /// * `Ok(false)` - Well-formed signature that does not match
    /// * `Err` - Header is malformed (wrong scheme, invalid hex)
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<bool, SignatureError> {
        let claimed = parse_signature(signature)?;
        let expected = self.compute_hmac(payload);

        // Length mismatch can leak in non-constant time; the digest length
        // is public so this is safe.
        if claimed.len() != expected.len() {
            return Ok(false);
        }

        Ok(claimed.ct_eq(&expected).into())
    }

    fn compute_hmac(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Extract the hex-encoded digest from the scheme-prefixed header value.
fn parse_signature(signature: &str) -> Result<Vec<u8>, SignatureError> {
    let Some(hex_digest) = signature.strip_prefix(SCHEME_PREFIX) else {
        return Err(SignatureError::InvalidFormat {
            message: format!(
                "signature must start with '{}', got: '{}'",
                SCHEME_PREFIX,
                signature.chars().take(10).collect::<String>()
            ),
        });
    };

    hex::decode(hex_digest).map_err(|e| SignatureError::InvalidFormat {
        message: format!("invalid hex encoding in signature: {}", e),
    })
}

// Don't expose the secret in debug output
impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
