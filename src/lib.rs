//! Bookshelf application library
//!
//! Book and author collections on top of a scan-only key-value store, exposed through a
//! single operation gateway.

pub mod error;
pub mod gateway;
pub mod modules;
pub mod query;
pub mod utils;

use std::sync::Arc;

use bookshelf_db::KeyValueStore;
use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub use error::{ServiceError, ServiceResult};
pub use gateway::Gateway;

/// Wire the gateway over `backend` and register every module.
pub fn build_registry(settings: &Settings, backend: Arc<dyn KeyValueStore>) -> ModuleRegistry {
    let gateway = Arc::new(Gateway::from_settings(backend, settings));
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, gateway);
    registry
}
