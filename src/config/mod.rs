//! Configuration types for the app toolkit.
//!
//! This module provides the configuration surface integrators use to set up
//! an app, and the resolved configuration the rest of the crate consumes.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`AppConfig`]: The full app configuration (credentials, storage, hooks, webhooks)
//! - [`AppConfigBuilder`]: A builder for constructing [`AppConfig`] instances
//! - [`ApiConfig`]: The resolved credential/URL subset shared with every handler
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`AppUrl`]: Validated newtypes
//! - [`ApiVersion`]: The Shopify Admin API version to use
//! - [`AppDistribution`]: How the app is distributed
//! - [`AuthPaths`]: The five auth routes derived from a single prefix
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, MemorySessionStorage};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .app_url("https://my-app.example.com")
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .session_storage(MemorySessionStorage::new())
//!     .build()
//!     .unwrap();
//!
//! assert!(config.api().is_embedded());
//! ```

mod distribution;
mod newtypes;
mod paths;
mod version;

pub use distribution::AppDistribution;
pub use newtypes::{ApiKey, ApiSecretKey, AppUrl, ShopDomain};
pub use paths::AuthPaths;
pub use version::ApiVersion;

use std::sync::Arc;

use crate::app::hooks::AppHooks;
use crate::auth::AuthScopes;
use crate::error::ConfigError;
use crate::storage::SessionStorage;
use crate::webhooks::WebhookSubscription;

/// This library's version, embedded in user agent strings.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The resolved configuration shared by every request handler.
///
/// `ApiConfig` is the part of the app configuration that OAuth, webhook
/// verification, and the API clients all need: credentials, the normalized
/// app URL, the derived auth paths, and the various mode flags. It is the
/// "resolved configuration" member of the parameter bundle handlers are
/// constructed with.
///
/// # Thread Safety
///
/// `ApiConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Key Rotation
///
/// The `old_api_secret_key` field supports seamless key rotation. When
/// validating HMAC signatures or session token JWTs, the primary key is
/// tried first with a fallback to the old key, so in-flight OAuth flows
/// and webhook deliveries survive a rotation.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    app_url: AppUrl,
    api_version: ApiVersion,
    is_embedded: bool,
    distribution: AppDistribution,
    use_online_tokens: bool,
    user_agent_prefix: String,
    api_host: Option<String>,
    auth: AuthPaths,
}

impl ApiConfig {
    /// Returns the API key (client ID).
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured for key rotation.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the OAuth scopes the app requests.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the normalized application URL.
    #[must_use]
    pub const fn app_url(&self) -> &AppUrl {
        &self.app_url
    }

    /// Returns the Admin API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns whether the app renders embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns how the app is distributed.
    #[must_use]
    pub const fn distribution(&self) -> AppDistribution {
        self.distribution
    }

    /// Returns whether the app uses online (user-specific) tokens.
    #[must_use]
    pub const fn use_online_tokens(&self) -> bool {
        self.use_online_tokens
    }

    /// Returns the user agent prefix for outgoing API requests.
    #[must_use]
    pub fn user_agent_prefix(&self) -> &str {
        &self.user_agent_prefix
    }

    /// Returns the API host override, if configured.
    ///
    /// When set (e.g., `http://127.0.0.1:8080` for a test double, or a proxy
    /// origin), token exchange and Admin API requests are sent to this origin
    /// instead of the shop's own domain.
    #[must_use]
    pub fn api_host(&self) -> Option<&str> {
        self.api_host.as_deref()
    }

    /// Returns the derived auth route paths.
    #[must_use]
    pub const fn auth(&self) -> &AuthPaths {
        &self.auth
    }

    /// Returns `true` if the app is a custom store app installed through the
    /// Shopify admin.
    #[must_use]
    pub const fn is_custom_store_app(&self) -> bool {
        self.distribution.is_custom_store_app()
    }

    /// Returns the origin API requests for `shop` should be sent to.
    ///
    /// This is the shop's own domain unless an [`api_host`](Self::api_host)
    /// override is configured.
    #[must_use]
    pub fn api_origin(&self, shop: &ShopDomain) -> String {
        self.api_host.as_ref().map_or_else(
            || format!("https://{}", shop.as_ref()),
            Clone::clone,
        )
    }
}

// Verify ApiConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiConfig>();
};

/// The full configuration for an app.
///
/// Combines the resolved [`ApiConfig`] with the pluggable pieces: the session
/// storage adapter, lifecycle hooks, and declared webhook subscriptions.
/// Constructed through [`AppConfig::builder`], which normalizes the app URL,
/// derives the auth paths, and validates required fields before anything else
/// runs.
pub struct AppConfig<S> {
    api: ApiConfig,
    session_storage: Arc<S>,
    hooks: AppHooks,
    webhooks: Vec<WebhookSubscription>,
}

impl AppConfig<()> {
    /// Creates a new builder for constructing an [`AppConfig`].
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }
}

impl<S: SessionStorage> AppConfig<S> {
    /// Returns the resolved API configuration.
    #[must_use]
    pub const fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Returns the session storage adapter.
    #[must_use]
    pub const fn session_storage(&self) -> &Arc<S> {
        &self.session_storage
    }

    /// Returns the configured lifecycle hooks.
    #[must_use]
    pub const fn hooks(&self) -> &AppHooks {
        &self.hooks
    }

    /// Returns the declared webhook subscriptions.
    #[must_use]
    pub fn webhook_subscriptions(&self) -> &[WebhookSubscription] {
        &self.webhooks
    }

    pub(crate) fn into_parts(self) -> (ApiConfig, Arc<S>, AppHooks, Vec<WebhookSubscription>) {
        (self.api, self.session_storage, self.hooks, self.webhooks)
    }
}

/// Builder for constructing [`AppConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key`, `app_url`, and
/// `session_storage`. All other fields have defaults.
///
/// # Defaults
///
/// - `api_version`: latest stable version
/// - `is_embedded`: `true`
/// - `distribution`: [`AppDistribution::AppStore`]
/// - `auth_path_prefix`: `"/auth"`
/// - `use_online_tokens`: `false`
/// - `scopes`: empty
///
/// # Example
///
/// ```rust
/// use shopify_app::{
///     ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppDistribution, MemorySessionStorage,
/// };
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .app_url("https://my-app.example.com")
///     .api_version(ApiVersion::V2025_10)
///     .distribution(AppDistribution::SingleMerchant)
///     .auth_path_prefix("/shopify/auth")
///     .use_online_tokens(true)
///     .session_storage(MemorySessionStorage::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.api().auth().callback_path(), "/shopify/auth/callback");
/// ```
#[derive(Default)]
pub struct AppConfigBuilder<S = ()> {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    app_url: Option<String>,
    api_version: Option<ApiVersion>,
    is_embedded: Option<bool>,
    distribution: Option<AppDistribution>,
    auth_path_prefix: Option<String>,
    use_online_tokens: Option<bool>,
    user_agent_prefix: Option<String>,
    api_host: Option<String>,
    session_storage: Option<Arc<S>>,
    hooks: AppHooks,
    webhooks: Vec<WebhookSubscription>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> AppConfigBuilder<S> {
    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the old API secret key for key rotation support.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes the app requests.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the URL the app is served from (required).
    ///
    /// The value is validated and reduced to its origin when the
    /// configuration is built.
    #[must_use]
    pub fn app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = Some(url.into());
        self
    }

    /// Sets the Admin API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets whether the app renders embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Sets how the app is distributed.
    #[must_use]
    pub const fn distribution(mut self, distribution: AppDistribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Sets the path prefix the auth routes are derived from.
    #[must_use]
    pub fn auth_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_path_prefix = Some(prefix.into());
        self
    }

    /// Sets whether the app uses online (user-specific) tokens.
    #[must_use]
    pub const fn use_online_tokens(mut self, online: bool) -> Self {
        self.use_online_tokens = Some(online);
        self
    }

    /// Sets a user agent prefix for outgoing API requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Overrides the origin API requests are sent to.
    ///
    /// Intended for proxies and test doubles; see [`ApiConfig::api_host`].
    #[must_use]
    pub fn api_host(mut self, origin: impl Into<String>) -> Self {
        self.api_host = Some(origin.into());
        self
    }

    /// Sets the lifecycle hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: AppHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Declares a webhook subscription to keep registered for every
    /// authenticated shop.
    #[must_use]
    pub fn webhook(mut self, subscription: WebhookSubscription) -> Self {
        self.webhooks.push(subscription);
        self
    }

    /// Sets the session storage adapter (required).
    ///
    /// Changes the builder's storage type parameter, so this is typically
    /// the last call before [`build`](Self::build).
    #[must_use]
    pub fn session_storage<T: SessionStorage>(self, storage: T) -> AppConfigBuilder<T> {
        AppConfigBuilder {
            api_key: self.api_key,
            api_secret_key: self.api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self.scopes,
            app_url: self.app_url,
            api_version: self.api_version,
            is_embedded: self.is_embedded,
            distribution: self.distribution,
            auth_path_prefix: self.auth_path_prefix,
            use_online_tokens: self.use_online_tokens,
            user_agent_prefix: self.user_agent_prefix,
            api_host: self.api_host,
            session_storage: Some(Arc::new(storage)),
            hooks: self.hooks,
            webhooks: self.webhooks,
        }
    }
}

impl<S: SessionStorage> AppConfigBuilder<S> {
    /// Builds the [`AppConfig`], validating required fields and normalizing
    /// the app URL.
    ///
    /// A `localhost` app URL without an explicit port picks up the `PORT`
    /// environment variable when one is set, matching the behavior of the
    /// Shopify CLI's development tunnel.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if `api_key`, `api_secret_key`,
    ///   or `app_url` are not set
    /// - [`ConfigError::InvalidAppUrl`] if the app URL cannot be parsed
    /// - [`ConfigError::MissingSessionStorage`] if no storage adapter was set
    pub fn build(self) -> Result<AppConfig<S>, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let raw_url = self
            .app_url
            .ok_or(ConfigError::MissingRequiredField { field: "app_url" })?;
        let session_storage = self
            .session_storage
            .ok_or(ConfigError::MissingSessionStorage)?;

        let mut app_url = AppUrl::new(raw_url)?;
        if app_url.host_name() == "localhost" && app_url.port().is_none() {
            if let Some(port) = std::env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
            {
                app_url = app_url.with_port(port);
            }
        }

        let library_agent = format!("Shopify App Library v{LIBRARY_VERSION}");
        let user_agent_prefix = match self.user_agent_prefix {
            Some(prefix) => format!("{prefix} | {library_agent}"),
            None => library_agent,
        };

        let auth = AuthPaths::new(self.auth_path_prefix.as_deref().unwrap_or("/auth"));

        Ok(AppConfig {
            api: ApiConfig {
                api_key,
                api_secret_key,
                old_api_secret_key: self.old_api_secret_key,
                scopes: self.scopes.unwrap_or_default(),
                app_url,
                api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
                is_embedded: self.is_embedded.unwrap_or(true),
                distribution: self.distribution.unwrap_or_default(),
                use_online_tokens: self.use_online_tokens.unwrap_or(false),
                user_agent_prefix,
                api_host: self.api_host,
                auth,
            },
            session_storage,
            hooks: self.hooks,
            webhooks: self.webhooks,
        })
    }
}
