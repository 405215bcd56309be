//! The pluggable session persistence boundary.
//!
//! OAuth sessions must survive between the authorization callback and later
//! requests, so the integrator supplies a [`SessionStorage`] adapter backed
//! by their database. [`MemorySessionStorage`] is provided for development
//! and tests.

mod memory;

pub use memory::MemorySessionStorage;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Session;
use crate::config::ShopDomain;

/// Errors surfaced by session storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend failed.
    ///
    /// Adapters wrap their database errors in this variant; the message is
    /// surfaced to the app's error handling, never to the merchant.
    #[error("Session storage backend error: {message}")]
    Backend {
        /// Description of the backend failure.
        message: String,
    },

    /// A stored session could not be decoded.
    #[error("Stored session is corrupt: {message}")]
    Corrupt {
        /// Description of the decoding failure.
        message: String,
    },
}

/// A persistence adapter for OAuth sessions.
///
/// Implementations store [`Session`] values keyed by their ID and support
/// lookup by shop for cleanup tasks (e.g. deleting all of a shop's sessions
/// when the app is uninstalled). Sessions serialize to JSON, so adapters
/// are free to persist them as documents, rows, or blobs.
///
/// Storing a session with an existing ID replaces the stored value.
/// Deleting an unknown ID is not an error.
///
/// # Example
///
/// ```rust
/// use shopify_app::{MemorySessionStorage, Session, SessionStorage, ShopDomain};
///
/// # async fn example() -> Result<(), shopify_app::StorageError> {
/// let storage = MemorySessionStorage::new();
/// let shop = ShopDomain::new("my-store").unwrap();
/// let session = Session::new(
///     Session::offline_id(&shop),
///     shop.clone(),
///     "token".to_string(),
///     "read_products".parse().unwrap(),
///     false,
///     None,
/// );
///
/// storage.store_session(session).await?;
/// let loaded = storage.load_session("offline_my-store.myshopify.com").await?;
/// assert!(loaded.is_some());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SessionStorage: Send + Sync + 'static {
    /// Persists a session, replacing any session with the same ID.
    async fn store_session(&self, session: Session) -> Result<(), StorageError>;

    /// Loads a session by ID. Returns `None` when no session is stored.
    async fn load_session(&self, id: &str) -> Result<Option<Session>, StorageError>;

    /// Deletes a session by ID. Unknown IDs are ignored.
    async fn delete_session(&self, id: &str) -> Result<(), StorageError>;

    /// Deletes several sessions by ID.
    async fn delete_sessions(&self, ids: &[String]) -> Result<(), StorageError> {
        for id in ids {
            self.delete_session(id).await?;
        }
        Ok(())
    }

    /// Returns every stored session for the given shop.
    async fn find_sessions_by_shop(&self, shop: &ShopDomain)
        -> Result<Vec<Session>, StorageError>;
}
