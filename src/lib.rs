//! # Shopify App Rust
//!
//! A toolkit for wiring authentication and sessions into Shopify apps,
//! embedded or standalone, from any Rust web framework.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe app configuration via [`AppConfig`] and its builder, with
//!   validated newtypes for credentials and URLs
//! - Derived auth route conventions from a single path prefix ([`AuthPaths`])
//! - The OAuth authorization code flow and App Bridge token exchange
//! - Session management with a pluggable [`SessionStorage`] boundary
//! - Webhook subscription sync and delivery verification (HMAC-SHA256)
//! - Distribution-aware surfaces: login form, embedded-iframe escape
//!   pages, and document response headers
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app::{ApiKey, ApiSecretKey, AppConfig, MemorySessionStorage, ShopifyApp};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .app_url("https://your-app.example.com")
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .session_storage(MemorySessionStorage::new())
//!     .build()
//!     .unwrap();
//!
//! let shopify = ShopifyApp::new(config);
//! ```
//!
//! ## Handling Requests
//!
//! The handlers speak framework-neutral [`AppRequest`] / [`AppResponse`]
//! values; the integrator converts to and from their framework's types:
//!
//! ```rust,ignore
//! use shopify_app::AdminAuth;
//!
//! // In an admin route
//! let context = match shopify.authenticate_admin(&request).await? {
//!     AdminAuth::Authenticated(context) => context,
//!     AdminAuth::Response(response) => return Ok(response),
//! };
//!
//! let shop_info = context
//!     .graphql()
//!     .query("query { shop { name } }", None)
//!     .await?;
//!
//! // In the webhook route
//! let delivery = shopify.authenticate_webhook(&request).await?;
//! match delivery.context().topic() {
//!     Some(WebhookTopic::AppUninstalled) => { /* clean up shop data */ }
//!     _ => {}
//! }
//! ```
//!
//! ## Webhooks and Hooks
//!
//! Webhook subscriptions declared on the configuration are synced with the
//! platform every time a shop completes OAuth; the `after_auth` lifecycle
//! hook runs at the same milestone with an authenticated admin context:
//!
//! ```rust,ignore
//! let config = AppConfig::builder()
//!     // ...credentials and URL...
//!     .webhook(WebhookSubscription::new(
//!         WebhookTopic::AppUninstalled,
//!         "/webhooks",
//!     ))
//!     .hooks(AppHooks::new().with_after_auth(SeedShopData))
//!     .session_storage(storage)
//!     .build()?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed
//!   explicitly through the shared parameter bundle
//! - **Fail-fast validation**: required configuration is checked when the
//!   config is built, not on the first request
//! - **Framework-neutral**: requests and responses are plain values
//! - **Thread-safe**: shared types are `Send + Sync`
//! - **Async-first**: designed for the Tokio runtime

pub mod app;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod storage;
pub mod webhooks;

// Re-export the public surface at the crate root for convenience
pub use app::{
    AdminAuth, AdminContext, AfterAuthHook, AppHooks, AppParams, AppRequest, AppRequestBuilder,
    AppResponse, AuthError, HookError, HttpMethod, LoginError, LoginHandler, ShopifyApp,
    WebhookAuth,
};
pub use auth::{AssociatedUser, AuthScopes, Session};
pub use config::{
    ApiConfig, ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppConfigBuilder, AppDistribution,
    AppUrl, AuthPaths, ShopDomain, LIBRARY_VERSION,
};
pub use error::ConfigError;
pub use storage::{MemorySessionStorage, SessionStorage, StorageError};
pub use webhooks::{
    WebhookContext, WebhookError, WebhookRegistrationResult, WebhookRegistry, WebhookRequest,
    WebhookSubscription, WebhookTopic,
};

// Re-export OAuth entry points for integrators driving the flow manually
pub use auth::oauth::{
    begin_auth, exchange_offline_token, exchange_online_token, validate_auth_callback, AuthQuery,
    BeginAuthResult, JwtPayload, OAuthError, StateParam,
};
