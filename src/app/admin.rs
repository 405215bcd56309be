//! The authenticated admin context handed to routes and hooks.

use crate::auth::Session;
use crate::clients::GraphqlClient;
use crate::config::ApiConfig;

/// An authenticated admin request context.
///
/// Returned by admin authentication and passed to the `after_auth`
/// lifecycle hook. Carries the session and constructs Admin API clients
/// bound to it.
///
/// # Example
///
/// ```rust,ignore
/// let context = match app.authenticate_admin(&request).await? {
///     AdminAuth::Authenticated(context) => context,
///     AdminAuth::Response(response) => return Ok(response),
/// };
///
/// let response = context
///     .graphql()
///     .query("query { shop { name } }", None)
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct AdminContext {
    session: Session,
    config: ApiConfig,
}

impl AdminContext {
    pub(crate) const fn new(session: Session, config: ApiConfig) -> Self {
        Self { session, config }
    }

    /// Returns the authenticated session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the shop this context authenticates.
    #[must_use]
    pub fn shop(&self) -> &crate::config::ShopDomain {
        &self.session.shop
    }

    /// Returns a GraphQL Admin API client bound to the session.
    #[must_use]
    pub fn graphql(&self) -> GraphqlClient {
        GraphqlClient::new(&self.session, &self.config)
    }
}

// Verify AdminContext is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AdminContext>();
};
