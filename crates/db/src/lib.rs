//! SQLite connection factory and migration runner for module-contributed schema.

use std::collections::HashSet;

use anyhow::Context;
use bookshelf_kernel::{settings::DatabaseSettings, ModuleRegistry};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};
use time::OffsetDateTime;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module TEXT NOT NULL,
        id TEXT NOT NULL,
        applied_at TEXT NOT NULL,
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool for the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .min_connections(1)
        .sqlx_logging(settings.sqlx_logging);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to database '{}'", settings.url))?;

    tracing::info!(target: "bookshelf-db", url = %settings.url, "database connected");
    Ok(db)
}

/// Apply every registered migration that has not been recorded yet.
///
/// Each migration runs in its own transaction together with its bookkeeping row.
/// Returns the number of migrations applied.
pub async fn migrate(db: &DatabaseConnection, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let backend = db.get_database_backend();

    db.execute_unprepared(MIGRATIONS_TABLE)
        .await
        .context("failed to create schema_migrations table")?;

    let applied = applied_migrations(db).await?;
    let mut count = 0;

    for (module, migration) in registry.collect_migrations() {
        if applied.contains(&(module.clone(), migration.id.to_string())) {
            tracing::debug!(%module, migration = migration.id, "migration already applied");
            continue;
        }

        tracing::info!(target: "bookshelf-db", %module, migration = migration.id, "applying migration");

        let txn = db.begin().await?;
        txn.execute_unprepared(migration.up)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        txn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO schema_migrations (module, id, applied_at) VALUES (?, ?, ?)",
            [
                module.clone().into(),
                migration.id.into(),
                OffsetDateTime::now_utc().to_string().into(),
            ],
        ))
        .await
        .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;
        txn.commit().await?;

        count += 1;
    }

    tracing::info!(target: "bookshelf-db", applied = count, "migrations complete");
    Ok(count)
}

async fn applied_migrations(db: &DatabaseConnection) -> anyhow::Result<HashSet<(String, String)>> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT module, id FROM schema_migrations",
        ))
        .await
        .context("failed to read schema_migrations")?;

    rows.iter()
        .map(|row| -> anyhow::Result<(String, String)> {
            Ok((row.try_get("", "module")?, row.try_get("", "id")?))
        })
        .collect()
}
