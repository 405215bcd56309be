//! Sessions: the authenticated state stored per shop (or per user).
//!
//! This module provides the [`Session`] type handed to API clients and
//! persisted through the configured storage adapter.

use crate::auth::{AssociatedUser, AuthScopes};
use crate::config::ShopDomain;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated connection to a shop.
///
/// Sessions hold the authentication state needed to make API requests on
/// behalf of a shop. They can be either online (user-specific, expiring) or
/// offline (app-level, non-expiring), and serialize to JSON so storage
/// adapters can persist them in any backend.
///
/// # Session IDs
///
/// Session IDs follow the platform's conventions so that a session can be
/// found again without extra indexes:
///
/// - offline: `offline_{shop}` ([`Session::offline_id`])
/// - online: `{shop}_{user_id}` ([`Session::online_id`])
///
/// # Example
///
/// ```rust
/// use shopify_app::{AuthScopes, Session, ShopDomain};
///
/// let shop = ShopDomain::new("my-store").unwrap();
/// let session = Session::new(
///     Session::offline_id(&shop),
///     shop,
///     "access-token".to_string(),
///     "read_products".parse().unwrap(),
///     false, // offline session
///     None,  // no expiration
/// );
///
/// assert_eq!(session.id, "offline_my-store.myshopify.com");
/// assert!(!session.expired());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    pub id: String,

    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token for API authentication.
    pub access_token: String,

    /// The OAuth scopes granted to this session.
    pub scopes: AuthScopes,

    /// Whether this is an online (user-specific) session.
    pub is_online: bool,

    /// When this session expires, if applicable.
    pub expires: Option<DateTime<Utc>>,

    /// The admin user this session belongs to, for online sessions.
    pub associated_user: Option<AssociatedUser>,
}

impl Session {
    /// Creates a new session with the specified parameters.
    #[must_use]
    pub const fn new(
        id: String,
        shop: ShopDomain,
        access_token: String,
        scopes: AuthScopes,
        is_online: bool,
        expires: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            shop,
            access_token,
            scopes,
            is_online,
            expires,
            associated_user: None,
        }
    }

    /// Returns the storage ID for a shop's offline session.
    #[must_use]
    pub fn offline_id(shop: &ShopDomain) -> String {
        format!("offline_{}", shop.as_ref())
    }

    /// Returns the storage ID for a user's online session.
    #[must_use]
    pub fn online_id(shop: &ShopDomain, user_id: i64) -> String {
        format!("{}_{user_id}", shop.as_ref())
    }

    /// Builds a session from a token endpoint response.
    ///
    /// Responses that carry an `associated_user` produce an online session
    /// keyed by [`Session::online_id`] with the user's granted scope and an
    /// expiration; everything else produces a non-expiring offline session.
    #[must_use]
    pub fn from_access_token_response(shop: ShopDomain, response: &AccessTokenResponse) -> Self {
        let scopes = response
            .associated_user_scope
            .as_deref()
            .or(Some(response.scope.as_str()))
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        match &response.associated_user {
            Some(user) => {
                let expires = response
                    .expires_in
                    .map(|seconds| Utc::now() + Duration::seconds(seconds));
                let mut session = Self::new(
                    Self::online_id(&shop, user.id),
                    shop,
                    response.access_token.clone(),
                    scopes,
                    true,
                    expires,
                );
                session.associated_user = Some(user.clone());
                session
            }
            None => Self::new(
                Self::offline_id(&shop),
                shop,
                response.access_token.clone(),
                scopes,
                false,
                None,
            ),
        }
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time are considered never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this session can authenticate requests.
    ///
    /// A session is active when it has an access token, has not expired, and
    /// its granted scopes cover the scopes the app is configured to require.
    /// A session stored before the app's scopes changed is not active, which
    /// is what triggers a re-authorization.
    #[must_use]
    pub fn is_active(&self, required_scopes: &AuthScopes) -> bool {
        !self.access_token.is_empty() && !self.expired() && self.scopes.covers(required_scopes)
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

/// The JSON body returned by the access token endpoint.
///
/// Offline grants return only `access_token` and `scope`. Online grants add
/// the expiration and the authorizing user.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The access token for Admin API calls.
    pub access_token: String,
    /// The scopes granted to the app.
    pub scope: String,
    /// Seconds until the token expires (online grants only).
    pub expires_in: Option<i64>,
    /// The scopes granted for the authorizing user (online grants only).
    pub associated_user_scope: Option<String>,
    /// The authorizing user (online grants only).
    pub associated_user: Option<AssociatedUser>,
}
