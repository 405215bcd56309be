//! In-memory session storage for development and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::auth::Session;
use crate::config::ShopDomain;
use crate::storage::{SessionStorage, StorageError};

/// A [`SessionStorage`] adapter that keeps sessions in memory.
///
/// Sessions are lost when the process exits, so this adapter is only
/// appropriate for development and tests. Production apps should implement
/// [`SessionStorage`] over their own database.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStorage {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn store_session(&self, session: Session) -> Result<(), StorageError> {
        self.write().insert(session.id.clone(), session);
        Ok(())
    }

    async fn load_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self.read().get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> Result<(), StorageError> {
        self.write().remove(id);
        Ok(())
    }

    async fn find_sessions_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Vec<Session>, StorageError> {
        Ok(self
            .read()
            .values()
            .filter(|session| &session.shop == shop)
            .cloned()
            .collect())
    }
}
