//! The error type surfaced by the assembled request handlers.

use thiserror::Error;

use crate::app::hooks::HookError;
use crate::auth::oauth::OAuthError;
use crate::storage::StorageError;
use crate::webhooks::WebhookError;

/// Errors surfaced by [`ShopifyApp`](crate::ShopifyApp) handlers.
///
/// Protocol-level rejections (bad callbacks, missing sessions, unsigned
/// webhooks) are returned as responses or as the wrapped module errors;
/// this enum is what a handler's `Result` propagates when the app itself
/// cannot proceed: storage failures, token endpoint failures, or a
/// failing lifecycle hook.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An OAuth operation failed.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// The session storage adapter failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Webhook verification or registration failed.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// The `after_auth` lifecycle hook returned an error.
    #[error("after_auth hook failed: {0}")]
    Hook(#[source] HookError),
}
