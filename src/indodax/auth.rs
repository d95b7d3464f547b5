//! Authentication utilities for the Indodax private API
//!
//! Private calls are signed with HMAC-SHA512 over the exact form-encoded
//! body that goes on the wire. The hex digest travels in the `Sign` header
//! and the API key in the `Key` header.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Generate the hex HMAC-SHA512 signature of a request body
///
/// # Example
///
/// ```
/// use indodax_mcp::indodax::auth::sign_request;
///
/// let signature = sign_request("method=getInfo&nonce=1", "s3cr3t");
/// assert_eq!(signature.len(), 128);
/// ```
pub fn sign_request(body: &str, secret: &str) -> String {
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a hex `Sign` value against a body in constant time
///
/// Malformed hex never verifies.
pub fn verify_signature(body: &str, secret: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// API credentials container
///
/// The secret never leaves this struct except as an HMAC key.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a request body with the secret key
    pub fn sign(&self, body: &str) -> String {
        sign_request(body, &self.api_secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
