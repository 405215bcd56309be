//! Signed cookies for OAuth state persistence.
//!
//! The CSRF state generated when an authorization begins must survive the
//! redirect round-trip to the shop and back. It is carried in a cookie
//! signed with the API secret key (`{value}.{hmac}`), so a tampered value
//! is rejected before the state comparison even runs. Verification tries
//! the old secret key as well, keeping in-flight flows alive across key
//! rotation.

use crate::auth::oauth::hmac::{compute_signature, constant_time_compare};
use crate::config::ApiConfig;

/// Name of the cookie carrying the OAuth state nonce.
pub const STATE_COOKIE_NAME: &str = "shopify_app_state";

/// How long the state cookie lives, in seconds.
///
/// Long enough for a merchant to complete the grant screen, short enough
/// not to linger.
const STATE_COOKIE_MAX_AGE: u32 = 600;

/// Signs `value` for use as a cookie payload.
#[must_use]
pub fn sign_value(value: &str, config: &ApiConfig) -> String {
    let signature = compute_signature(value, config.api_secret_key().as_ref());
    format!("{value}.{signature}")
}

/// Verifies a signed cookie payload and returns the original value.
///
/// Returns `None` when the payload is malformed or neither secret key
/// produces a matching signature.
#[must_use]
pub fn verify_value(raw: &str, config: &ApiConfig) -> Option<String> {
    let (value, signature) = raw.rsplit_once('.')?;

    let expected = compute_signature(value, config.api_secret_key().as_ref());
    if constant_time_compare(&expected, signature) {
        return Some(value.to_string());
    }

    let old_secret = config.old_api_secret_key()?;
    let expected_old = compute_signature(value, old_secret.as_ref());
    if constant_time_compare(&expected_old, signature) {
        return Some(value.to_string());
    }

    None
}

/// Builds the `Set-Cookie` header value carrying the signed state.
#[must_use]
pub fn state_cookie(value: &str, config: &ApiConfig) -> String {
    let signed = sign_value(value, config);
    let secure = if config.app_url().scheme() == "https" {
        "; Secure"
    } else {
        ""
    };
    format!(
        "{STATE_COOKIE_NAME}={signed}; Path=/; Max-Age={STATE_COOKIE_MAX_AGE}; HttpOnly; SameSite=Lax{secure}"
    )
}

/// Builds the `Set-Cookie` header value that clears the state cookie.
#[must_use]
pub fn clear_state_cookie() -> String {
    format!("{STATE_COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
