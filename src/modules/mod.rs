pub mod authors;
pub mod books;
pub mod catalog;
pub mod relations;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;

use crate::gateway::Gateway;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, gateway: Arc<Gateway>) {
    registry.register(catalog::create_module(gateway));
}
