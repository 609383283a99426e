//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain service and ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::PropertyStore;
use crate::domain::RegistryService;

/// Dependency bundle for HTTP and RPC handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registry: Arc<RegistryService>,
    pub properties: Arc<dyn PropertyStore>,
}

impl HttpState {
    pub fn new(registry: Arc<RegistryService>, properties: Arc<dyn PropertyStore>) -> Self {
        Self {
            registry,
            properties,
        }
    }
}
