//! Redis-backed `PropertyStore` implementation.

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::RedisConnectionManager;
use tracing::debug;

use crate::domain::ports::{PropertyStore, PropertyStoreError};
use crate::domain::UserProperty;

/// Key prefix namespacing property documents in the shared keyspace.
const KEY_PREFIX: &str = "userproperty";

fn document_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}:{user_id}")
}

/// Redis-backed implementation of the `PropertyStore` port.
///
/// Documents are serialized as JSON, one key per user identifier. A write
/// replaces whatever the key held before; reads of absent keys are `None`.
#[derive(Clone)]
pub struct RedisPropertyStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisPropertyStore {
    /// Connect a pooled store to the Redis instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyStoreError::Connection` when the URL does not parse
    /// or the pool cannot be built.
    pub async fn connect(url: &str) -> Result<Self, PropertyStoreError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| PropertyStoreError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| PropertyStoreError::connection(err.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8_redis::bb8::PooledConnection<'_, RedisConnectionManager>, PropertyStoreError>
    {
        self.pool
            .get()
            .await
            .map_err(|err| PropertyStoreError::connection(err.to_string()))
    }
}

fn map_command_error(error: bb8_redis::redis::RedisError) -> PropertyStoreError {
    debug!(error = %error, "redis command failed");
    if error.is_connection_refusal() || error.is_connection_dropped() || error.is_timeout() {
        PropertyStoreError::connection(error.to_string())
    } else {
        PropertyStoreError::query(error.to_string())
    }
}

#[async_trait]
impl PropertyStore for RedisPropertyStore {
    async fn save(&self, property: &UserProperty) -> Result<UserProperty, PropertyStoreError> {
        let document = serde_json::to_string(property)
            .map_err(|err| PropertyStoreError::query(format!("property serialization: {err}")))?;
        let mut conn = self.connection().await?;
        let _: () = conn
            .set(document_key(&property.user_id), document)
            .await
            .map_err(map_command_error)?;
        Ok(property.clone())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProperty>, PropertyStoreError> {
        let mut conn = self.connection().await?;
        let stored: Option<String> = conn
            .get(document_key(user_id))
            .await
            .map_err(map_command_error)?;

        stored
            .map(|document| {
                serde_json::from_str(&document).map_err(|err| {
                    PropertyStoreError::query(format!("corrupted property document: {err}"))
                })
            })
            .transpose()
    }
}
