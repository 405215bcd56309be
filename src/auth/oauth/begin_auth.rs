//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the authorization code flow: it
//! generates a cryptographically secure state parameter for CSRF protection
//! and the authorization URL to redirect the merchant to.

use crate::auth::oauth::state::StateParam;
use crate::config::{ApiConfig, ShopDomain};

/// Result of initiating OAuth authorization.
///
/// Contains the authorization URL to redirect the merchant to and the state
/// parameter that must be persisted (this crate stores it in a signed
/// cookie) for verification when the callback is received.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,

    /// The state parameter generated for this authorization request.
    ///
    /// Compare this against the `state` parameter in the OAuth callback to
    /// prevent CSRF attacks.
    pub state: StateParam,
}

/// Initiates the OAuth authorization code flow.
///
/// Builds the authorization URL on the shop's own domain with the app's
/// client ID, the configured scopes, the callback redirect URI derived from
/// the app URL, and a fresh state nonce. Online (user-specific) grants add
/// `grant_options[]=per-user`.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::begin_auth;
/// use shopify_app::{ApiKey, ApiSecretKey, AppConfig, MemorySessionStorage, ShopDomain};
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .app_url("https://my-app.example.com")
///     .scopes("read_products".parse().unwrap())
///     .session_storage(MemorySessionStorage::new())
///     .build()
///     .unwrap();
///
/// let shop = ShopDomain::new("test-shop").unwrap();
/// let result = begin_auth(config.api(), &shop, false);
///
/// assert!(result
///     .auth_url
///     .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
/// ```
#[must_use]
pub fn begin_auth(config: &ApiConfig, shop: &ShopDomain, is_online: bool) -> BeginAuthResult {
    let state = StateParam::new();

    let redirect_uri = format!(
        "{}{}",
        config.app_url().as_ref(),
        config.auth().callback_path()
    );

    let mut params = vec![
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", config.scopes().to_string()),
        ("redirect_uri", redirect_uri),
        ("state", state.to_string()),
    ];

    if is_online {
        params.push(("grant_options[]", "per-user".to_string()));
    }

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    BeginAuthResult { auth_url, state }
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};
