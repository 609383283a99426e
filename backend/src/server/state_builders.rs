//! Builders for the HTTP state backing every handler.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{InMemoryPropertyStore, InMemoryUserStore, PropertyStore, UserStore};
use crate::domain::RegistryService;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::DieselUserStore;

use super::ServerConfig;

/// Build the shared HTTP state, preferring configured store adapters and
/// falling back to the in-memory implementations.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let user_store: Arc<dyn UserStore> = match &config.db_pool {
        Some(pool) => Arc::new(DieselUserStore::new(pool.clone())),
        None => Arc::new(InMemoryUserStore::new()),
    };
    let properties: Arc<dyn PropertyStore> = match &config.property_store {
        Some(store) => Arc::clone(store),
        None => Arc::new(InMemoryPropertyStore::new()),
    };

    web::Data::new(HttpState::new(
        Arc::new(RegistryService::new(user_store)),
        properties,
    ))
}
