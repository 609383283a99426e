//! Port abstraction for user property document storage.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::UserProperty;

/// Errors raised by property store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyStoreError {
    /// Store connection could not be established.
    #[error("property store connection failed: {message}")]
    Connection { message: String },
    /// Read or write failed during execution.
    #[error("property store query failed: {message}")]
    Query { message: String },
}

impl PropertyStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for per-user property documents.
///
/// Keyed by the caller-supplied user identifier; at most one document per
/// key. No referential integrity with the user store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Insert or replace the document stored under the property's user id.
    async fn save(&self, property: &UserProperty) -> Result<UserProperty, PropertyStoreError>;

    /// Fetch the document stored under this user id.
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProperty>, PropertyStoreError>;
}

/// In-memory [`PropertyStore`] used by tests and the dev-mode server.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    state: Mutex<HashMap<String, UserProperty>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserProperty>>, PropertyStoreError> {
        self.state
            .lock()
            .map_err(|_| PropertyStoreError::query("property store state lock poisoned"))
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn save(&self, property: &UserProperty) -> Result<UserProperty, PropertyStoreError> {
        let mut state = self.lock()?;
        state.insert(property.user_id.clone(), property.clone());
        Ok(property.clone())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProperty>, PropertyStoreError> {
        let state = self.lock()?;
        Ok(state.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(user_id: &str, address: &str) -> UserProperty {
        UserProperty {
            user_id: user_id.to_owned(),
            address: Some(address.to_owned()),
            organisation: None,
            favourite_colour: None,
        }
    }

    #[tokio::test]
    async fn missing_documents_read_as_none() {
        let store = InMemoryPropertyStore::new();
        assert_eq!(store.find_by_id("42").await.expect("read"), None);
    }

    #[tokio::test]
    async fn a_second_save_replaces_the_first() {
        let store = InMemoryPropertyStore::new();
        store.save(&property("42", "Main")).await.expect("save");
        store.save(&property("42", "Elm")).await.expect("save");

        let stored = store
            .find_by_id("42")
            .await
            .expect("read")
            .expect("document present");
        assert_eq!(stored.address.as_deref(), Some("Elm"));
    }

    #[tokio::test]
    async fn documents_are_isolated_per_user_id() {
        let store = InMemoryPropertyStore::new();
        store.save(&property("1", "Main")).await.expect("save");
        store.save(&property("2", "Elm")).await.expect("save");

        assert_eq!(
            store
                .find_by_id("1")
                .await
                .expect("read")
                .expect("document")
                .address
                .as_deref(),
            Some("Main")
        );
    }
}
