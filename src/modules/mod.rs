pub mod books;

use std::sync::Arc;

use bookshelf_kernel::{settings::Settings, MessageSource, ModuleRegistry};
use sea_orm::DatabaseConnection;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    db: &DatabaseConnection,
    messages: Arc<dyn MessageSource>,
    settings: &Settings,
) {
    registry.register(books::create_module(db.clone(), messages, settings));
}
