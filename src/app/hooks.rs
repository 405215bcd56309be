//! Lifecycle hooks.
//!
//! Hooks let the integrator run their own code at protocol milestones. The
//! one milestone today is `after_auth`: invoked with an authenticated
//! [`AdminContext`] whenever a new session is obtained, whether through the
//! OAuth callback or through token exchange. Typical uses are seeding shop
//! data on install and reacting to re-authentications.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::admin::AdminContext;

/// The error type hooks may fail with.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A callback invoked after a session is obtained.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use shopify_app::{AdminContext, AfterAuthHook, AppHooks, HookError};
///
/// struct SeedShopData;
///
/// #[async_trait]
/// impl AfterAuthHook for SeedShopData {
///     async fn after_auth(&self, context: &AdminContext) -> Result<(), HookError> {
///         println!("authenticated shop: {}", context.shop());
///         Ok(())
///     }
/// }
///
/// let hooks = AppHooks::new().with_after_auth(SeedShopData);
/// assert!(hooks.has_after_auth());
/// ```
#[async_trait]
pub trait AfterAuthHook: Send + Sync {
    /// Runs after a new session has been stored.
    ///
    /// # Errors
    ///
    /// Errors propagate out of the authentication flow as
    /// [`AuthError::Hook`](crate::AuthError::Hook).
    async fn after_auth(&self, context: &AdminContext) -> Result<(), HookError>;
}

/// The set of configured lifecycle hooks.
#[derive(Clone, Default)]
pub struct AppHooks {
    after_auth: Option<Arc<dyn AfterAuthHook>>,
}

impl AppHooks {
    /// Creates an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `after_auth` hook.
    #[must_use]
    pub fn with_after_auth(mut self, hook: impl AfterAuthHook + 'static) -> Self {
        self.after_auth = Some(Arc::new(hook));
        self
    }

    /// Returns `true` when an `after_auth` hook is configured.
    #[must_use]
    pub const fn has_after_auth(&self) -> bool {
        self.after_auth.is_some()
    }

    pub(crate) async fn run_after_auth(&self, context: &AdminContext) -> Result<(), HookError> {
        match &self.after_auth {
            Some(hook) => hook.after_auth(context).await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for AppHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHooks")
            .field("after_auth", &self.after_auth.is_some())
            .finish()
    }
}
