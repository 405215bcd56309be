//! OAuth-specific error types.

use thiserror::Error;

/// Errors that can occur during OAuth operations.
///
/// This enum covers all failure modes across the authorization code flow and
/// token exchange, from HMAC validation to the token endpoint request.
///
/// # Thread Safety
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async
/// boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// HMAC signature validation failed.
    ///
    /// The callback request's HMAC signature does not match the value
    /// computed with the API secret key. This could indicate a tampered
    /// request or a misconfigured secret key.
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// OAuth state parameter mismatch.
    ///
    /// The state parameter in the callback does not match the state
    /// generated when the authorization began. This is the CSRF guard.
    #[error("State parameter mismatch: expected '{expected}', received '{received}'")]
    StateMismatch {
        /// The expected state value that was generated.
        expected: String,
        /// The state value received in the callback.
        received: String,
    },

    /// Token request failed.
    ///
    /// The POST to the access token endpoint returned a non-success status
    /// or could not be completed.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned (0 for transport failures).
        status: u16,
        /// The error message from the response.
        message: String,
    },

    /// Callback parameters are invalid or malformed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// Description of what's invalid about the callback.
        reason: String,
    },

    /// A session token (JWT) failed to decode or validate.
    #[error("Invalid session token: {reason}")]
    InvalidJwt {
        /// Description of the validation failure.
        reason: String,
    },

    /// Token exchange was attempted for a non-embedded app.
    ///
    /// Session tokens are only issued to apps embedded in the Shopify admin,
    /// so token exchange requires `is_embedded(true)`.
    #[error("Token exchange is only available to embedded apps")]
    NotEmbeddedApp,
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
