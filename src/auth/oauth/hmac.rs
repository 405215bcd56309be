//! HMAC-SHA256 signing and validation.
//!
//! OAuth callbacks carry a hex-encoded signature over the query string;
//! webhook deliveries carry a base64-encoded signature over the raw body.
//! Both are computed here, and all comparisons are constant-time.
//!
//! # Key Rotation
//!
//! [`validate_callback_hmac`] tries the primary API secret key first and
//! falls back to the old secret key when one is configured, so in-flight
//! flows survive a key rotation.

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;
use crate::config::ApiConfig;

type HmacSha256 = Hmac<Sha256>;

/// Computes a hex-encoded HMAC-SHA256 signature for the given message.
///
/// This is the encoding used for OAuth callback signatures and for the
/// crate's signed cookies.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64); // SHA256 produces 32 bytes = 64 hex chars
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex_encode(&mac.finalize().into_bytes())
}

/// Computes a base64-encoded HMAC-SHA256 signature for raw bytes.
///
/// This is the encoding used in the `X-Shopify-Hmac-SHA256` webhook header.
/// The message is taken as raw bytes so the exact delivery payload is signed
/// without UTF-8 interpretation.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::hmac::compute_signature_base64;
///
/// let sig = compute_signature_base64(b"webhook payload", "secret-key");
/// assert_eq!(sig.len(), 44); // base64 of 32 bytes
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Performs constant-time comparison of two strings.
///
/// Used for HMAC verification and state parameter validation to prevent
/// timing attacks.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    // ConstantTimeEq handles different lengths securely
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Validates the HMAC signature of an OAuth callback.
///
/// The signature covers every callback query parameter except `hmac`
/// itself, sorted by name. Both the primary and (when configured) the old
/// API secret key are tried.
#[must_use]
pub fn validate_callback_hmac(query: &AuthQuery, config: &ApiConfig) -> bool {
    let signable = query.to_signable_string();
    let received = query.hmac();

    let computed = compute_signature(&signable, config.api_secret_key().as_ref());
    if constant_time_compare(&computed, received) {
        return true;
    }

    if let Some(old_secret) = config.old_api_secret_key() {
        let computed_old = compute_signature(&signable, old_secret.as_ref());
        if constant_time_compare(&computed_old, received) {
            return true;
        }
    }

    false
}

// hex is not in the dependency tree; two helpers are not worth a crate
fn hex_encode(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";
    let mut result = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        result.push(HEX_CHARS[(byte >> 4) as usize] as char);
        result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
    }
    result
}
