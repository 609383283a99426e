//! HTTP server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::ports::PropertyStore;
use crate::outbound::documents::RedisPropertyStore;
use crate::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Assemble pool settings from the database URL and the optional tuning
/// variables, rejecting values that do not parse as numbers.
fn pool_config_from_parts(
    url: String,
    max_connections: Option<String>,
    connect_timeout_secs: Option<String>,
) -> std::io::Result<PoolConfig> {
    let mut config = PoolConfig::new(url);
    if let Some(raw) = max_connections {
        let max = raw.parse::<u32>().map_err(|err| {
            std::io::Error::other(format!("invalid DB_POOL_MAX_CONNECTIONS: {err}"))
        })?;
        config = config.with_max_connections(max);
    }
    if let Some(raw) = connect_timeout_secs {
        let secs = raw.parse::<u64>().map_err(|err| {
            std::io::Error::other(format!("invalid DB_POOL_CONNECT_TIMEOUT_SECS: {err}"))
        })?;
        config = config.with_connect_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) property_store: Option<Arc<dyn PropertyStore>>,
}

impl ServerConfig {
    /// Construct a configuration binding to the given address, with no
    /// backing stores attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            property_store: None,
        }
    }

    /// Attach a database connection pool for the user store adapter.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach a property store adapter.
    #[must_use]
    pub fn with_property_store(mut self, store: Arc<dyn PropertyStore>) -> Self {
        self.property_store = Some(store);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Load the configuration from `BIND_ADDR`, `DATABASE_URL`, and
    /// `REDIS_URL`, with pool tuning from `DB_POOL_MAX_CONNECTIONS` and
    /// `DB_POOL_CONNECT_TIMEOUT_SECS` when a database is configured.
    ///
    /// Either store URL may be absent: the server then falls back to its
    /// in-memory implementation, which keeps local development and tests
    /// free of external services but persists nothing across restarts.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when `BIND_ADDR` or a tuning variable
    /// does not parse, or a configured store cannot be reached.
    pub async fn load_from_env() -> std::io::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?;
        let mut config = Self::new(bind_addr);

        match env::var("DATABASE_URL") {
            Ok(url) => {
                let pool_config = pool_config_from_parts(
                    url,
                    env::var("DB_POOL_MAX_CONNECTIONS").ok(),
                    env::var("DB_POOL_CONNECT_TIMEOUT_SECS").ok(),
                )?;
                let pool = DbPool::new(pool_config)
                    .await
                    .map_err(std::io::Error::other)?;
                config = config.with_db_pool(pool);
            }
            Err(_) => {
                warn!("DATABASE_URL not set; user records held in memory only");
            }
        }

        match env::var("REDIS_URL") {
            Ok(url) => {
                let store = RedisPropertyStore::connect(&url)
                    .await
                    .map_err(std::io::Error::other)?;
                config = config.with_property_store(Arc::new(store));
            }
            Err(_) => {
                warn!("REDIS_URL not set; user properties held in memory only");
            }
        }

        Ok(config)
    }
}
