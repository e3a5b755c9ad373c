//! Application bootstrap: database, modules and HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, MessageSource, ModuleRegistry};
use sea_orm::DatabaseConnection;

use crate::modules;

/// Built-in message bundles overlaid with the configured bundle dir.
pub fn message_source(settings: &Settings) -> anyhow::Result<Arc<dyn MessageSource>> {
    let messages = modules::books::messages::builtin()
        .configure(&settings.i18n)
        .context("failed to load message bundles")?;
    Ok(Arc::new(messages))
}

/// Registry holding every project module, bound to `db`.
pub fn build_registry(
    db: &DatabaseConnection,
    settings: &Settings,
) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, db, message_source(settings)?, settings);
    Ok(registry)
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(&db, settings)?;
    let applied = bookshelf_db::migrate(&db, &registry).await?;
    db.close().await.context("failed to close database")?;
    Ok(applied)
}

/// Serve until a shutdown signal arrives, then stop modules.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let db = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(&db, settings)?;

    let applied = bookshelf_db::migrate(&db, &registry).await?;
    tracing::info!(applied, "database schema up to date");

    let ctx = InitCtx {
        settings,
        db: &db,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, settings).await;

    registry.stop_modules().await?;
    db.close().await.context("failed to close database")?;
    served
}
