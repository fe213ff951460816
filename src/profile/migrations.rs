//! Version-tracked schema migrations for the profile database.
//!
//! Each migration has a version number and SQL. `run_migrations()` checks
//! the current version and applies only the new ones sequentially.

use libsql::Connection;

use crate::error::RepositoryError;

/// A single migration step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. Add new versions to the end.
static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "profiles",
    sql: r#"
        CREATE TABLE IF NOT EXISTS profiles (
            identity INTEGER PRIMARY KEY,
            display_name TEXT,
            gender TEXT NOT NULL,
            notification_hour INTEGER NOT NULL,
            notification_minute INTEGER NOT NULL,
            notification_frequency TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
}];

/// Apply all pending migrations.
pub async fn run_migrations(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        (),
    )
    .await
    .map_err(|e| RepositoryError::Migration(format!("creating _migrations table: {e}")))?;

    let current = current_version(conn).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        conn.execute_batch(migration.sql)
            .await
            .map_err(|e| {
                RepositoryError::Migration(format!(
                    "applying {} (v{}): {e}",
                    migration.name, migration.version
                ))
            })?;
        conn.execute(
            "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            libsql::params![
                migration.version,
                migration.name,
                chrono::Utc::now().to_rfc3339()
            ],
        )
        .await
        .map_err(|e| {
            RepositoryError::Migration(format!("recording v{}: {e}", migration.version))
        })?;
        tracing::info!(version = migration.version, name = migration.name, "Migration applied");
    }

    Ok(())
}

/// Highest applied migration version, 0 if none.
async fn current_version(conn: &Connection) -> Result<i64, RepositoryError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| RepositoryError::Migration(format!("reading migration version: {e}")))?;

    match rows
        .next()
        .await
        .map_err(|e| RepositoryError::Migration(format!("reading migration version: {e}")))?
    {
        Some(row) => row
            .get::<i64>(0)
            .map_err(|e| RepositoryError::Migration(format!("reading migration version: {e}"))),
        None => Ok(0),
    }
}
