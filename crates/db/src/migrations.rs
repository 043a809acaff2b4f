use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Runs pending migrations and reports which ones were newly applied, as
/// `"<version> <description>"` lines for operator output.
pub async fn run_pending_with_report(pool: &DbPool) -> Result<Vec<String>, MigrateError> {
    let before = applied_versions(pool).await;
    MIGRATOR.run(pool).await?;

    let report = MIGRATOR
        .migrations
        .iter()
        .filter(|migration| !migration.migration_type.is_down_migration())
        .filter(|migration| !before.contains(&migration.version))
        .map(|migration| format!("{:04} {}", migration.version, migration.description))
        .collect();
    Ok(report)
}

/// Versions already recorded in the bookkeeping table. An absent table (a
/// database that has never been migrated) reads as no versions.
async fn applied_versions(pool: &DbPool) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations")
        .fetch_all(pool)
        .await
        .unwrap_or_default()
}
