//! App assembly: the wiring layer integrators interact with.
//!
//! [`ShopifyApp::new`] takes a validated [`AppConfig`], builds the shared
//! [`AppParams`] bundle (resolved configuration, session storage, hooks,
//! webhook registry), and exposes the request-handling entry points:
//! admin authentication, webhook authentication, webhook registration,
//! the distribution-gated login handler, and document response headers.

pub mod admin;
pub mod authenticate;
mod cookies;
mod error;
pub mod headers;
pub mod hooks;
mod login;
mod pages;
pub mod request;
mod webhook;

pub use admin::AdminContext;
pub use authenticate::AdminAuth;
pub use error::AuthError;
pub use hooks::{AfterAuthHook, AppHooks, HookError};
pub use login::LoginError;
pub use request::{AppRequest, AppRequestBuilder, AppResponse, HttpMethod};
pub use webhook::WebhookAuth;

use std::sync::Arc;

use crate::auth::Session;
use crate::config::{ApiConfig, AppConfig};
use crate::storage::SessionStorage;
use crate::webhooks::{WebhookRegistrationResult, WebhookRegistry};

use authenticate::AuthStrategy;

/// The shared parameter bundle every handler is constructed with.
///
/// Holds the resolved configuration, the session storage adapter, the
/// lifecycle hooks, and the webhook registry. Handlers share one bundle
/// behind an `Arc`.
pub struct AppParams<S> {
    pub(crate) config: ApiConfig,
    pub(crate) storage: Arc<S>,
    pub(crate) hooks: hooks::AppHooks,
    pub(crate) registry: WebhookRegistry,
}

impl<S: SessionStorage> AppParams<S> {
    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Returns the session storage adapter.
    #[must_use]
    pub const fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Returns the webhook registry.
    #[must_use]
    pub const fn registry(&self) -> &WebhookRegistry {
        &self.registry
    }
}

/// The merchant-facing login handler.
///
/// Only available for distributions with a login surface; obtained from
/// [`ShopifyApp::login`].
#[derive(Clone, Copy, Debug)]
pub struct LoginHandler<'a> {
    config: &'a ApiConfig,
}

impl LoginHandler<'_> {
    /// Handles a login form submission.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError`] when the submitted shop is missing or
    /// invalid; the form should re-render with the error.
    pub fn handle(&self, request: &AppRequest) -> Result<AppResponse, LoginError> {
        login::login(self.config, request)
    }
}

/// An assembled app: configuration plus the wired request handlers.
///
/// # Example
///
/// ```rust
/// use shopify_app::{
///     ApiKey, ApiSecretKey, AppConfig, AppDistribution, MemorySessionStorage, ShopifyApp,
/// };
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("api-secret").unwrap())
///     .app_url("https://my-app.example.com")
///     .scopes("read_products".parse().unwrap())
///     .session_storage(MemorySessionStorage::new())
///     .build()
///     .unwrap();
///
/// let app = ShopifyApp::new(config);
/// assert!(app.login().is_some()); // App Store apps expose the login form
/// ```
pub struct ShopifyApp<S: SessionStorage> {
    params: Arc<AppParams<S>>,
    auth: AuthStrategy<S>,
}

impl<S: SessionStorage> ShopifyApp<S> {
    /// Assembles the app from a validated configuration.
    #[must_use]
    pub fn new(config: AppConfig<S>) -> Self {
        let (api, storage, hooks, webhooks) = config.into_parts();

        let params = Arc::new(AppParams {
            config: api,
            storage,
            hooks,
            registry: WebhookRegistry::from_subscriptions(webhooks),
        });

        Self {
            auth: AuthStrategy::new(Arc::clone(&params)),
            params,
        }
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.params.config
    }

    /// Returns the session storage adapter.
    #[must_use]
    pub fn session_storage(&self) -> &Arc<S> {
        &self.params.storage
    }

    /// Returns the shared parameter bundle.
    #[must_use]
    pub fn params(&self) -> &AppParams<S> {
        &self.params
    }

    /// Authenticates an admin request.
    ///
    /// Serves the derived auth routes directly and validates sessions on
    /// every other path; see [`AdminAuth`] for the two outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when storage, the token endpoint, or a
    /// lifecycle hook fails. Protocol-level rejections come back as
    /// [`AdminAuth::Response`], not as errors.
    pub async fn authenticate_admin(&self, request: &AppRequest) -> Result<AdminAuth, AuthError> {
        self.auth.authenticate(request).await
    }

    /// Authenticates a webhook delivery.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Webhook`] for unsigned, tampered, or
    /// unparseable deliveries, and [`AuthError::Storage`] when the session
    /// lookup fails.
    pub async fn authenticate_webhook(
        &self,
        request: &AppRequest,
    ) -> Result<WebhookAuth, AuthError> {
        webhook::authenticate(&self.params.config, self.params.storage.as_ref(), request).await
    }

    /// Syncs the declared webhook subscriptions for a shop's session.
    ///
    /// Runs automatically after OAuth completes; exposed for background
    /// jobs and re-sync tasks.
    pub async fn register_webhooks(&self, session: &Session) -> Vec<WebhookRegistrationResult> {
        self.params
            .registry
            .register_all(session, &self.params.config)
            .await
    }

    /// Returns the login handler, when this distribution has one.
    ///
    /// Apps distributed through the Shopify admin have no merchant-facing
    /// login and get `None`.
    #[must_use]
    pub fn login(&self) -> Option<LoginHandler<'_>> {
        self.params
            .config
            .distribution()
            .can_use_login_form()
            .then_some(LoginHandler {
                config: &self.params.config,
            })
    }

    /// Adds the document response headers (CSP frame-ancestors) for the
    /// given shop to a response.
    pub fn add_document_response_headers(
        &self,
        shop: Option<&str>,
        response: &mut AppResponse,
    ) {
        headers::add_document_response_headers(&self.params.config, shop, response);
    }
}
