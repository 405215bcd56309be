//! State parameter handling for OAuth CSRF protection.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// OAuth state parameter for CSRF protection.
///
/// A cryptographically secure random nonce generated when an authorization
/// begins, persisted by the app (in a signed cookie), and compared in
/// constant time when the callback arrives.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::StateParam;
///
/// let state = StateParam::new();
/// assert_eq!(state.as_ref().len(), 15);
/// assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam {
    value: String,
}

impl StateParam {
    /// The length of generated nonces.
    const NONCE_LENGTH: usize = 15;

    /// Creates a new state parameter with a secure random nonce.
    #[must_use]
    pub fn new() -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();

        Self { value }
    }

    /// Wraps an existing state value, e.g. one recovered from a cookie.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { value: raw.into() }
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};
