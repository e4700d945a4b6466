use anyhow::Result;
use chrono::Utc;
use libsql::Connection;

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 2;

/// Run database migrations
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;

    if current_version >= SCHEMA_VERSION {
        tracing::debug!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    tracing::info!("Running migrations from version {} to {}", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        run_migration_v1(conn).await?;
        record_migration(conn, 1, "Create sites table").await?;
    }

    if current_version < 2 {
        run_migration_v2(conn).await?;
        record_migration(conn, 2, "Index enabled sites").await?;
    }

    tracing::info!("Database migrations completed successfully (now at version {})", SCHEMA_VERSION);
    Ok(())
}

/// Get current schema version from database
async fn get_current_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i32> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

/// Record that a migration was applied
async fn record_migration(conn: &Connection, version: i32, description: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, Utc::now().timestamp(), description],
    )
    .await?;

    tracing::info!("Applied migration v{}: {}", version, description);
    Ok(())
}

/// Migration v1: sites table
///
/// `url` is UNIQUE so two writers racing past the application check still
/// cannot both commit the same URL.
async fn run_migration_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            enabled INTEGER NOT NULL DEFAULT 1,
            check_ssl_certificate INTEGER NOT NULL DEFAULT 0,
            uptime_status TEXT NOT NULL DEFAULT 'not_yet_checked',
            uptime_last_check_date INTEGER,
            uptime_status_last_change_date INTEGER,
            down_event_fired_on_date INTEGER,
            ssl_certificate_status TEXT NOT NULL DEFAULT 'not_yet_checked',
            ssl_certificate_expiration_date INTEGER
        )",
        (),
    )
    .await?;

    Ok(())
}

/// Migration v2: the scheduler only ever loads enabled sites
async fn run_migration_v2(conn: &Connection) -> Result<()> {
    conn.execute("CREATE INDEX IF NOT EXISTS idx_sites_enabled ON sites(enabled)", ())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_helpers::create_test_database;

    #[tokio::test]
    async fn test_migrations_are_idempotent() -> Result<()> {
        let (pool, _dir) = create_test_database().await?;
        let conn = pool.get().await?;

        // Already migrated by the helper; a second run is a no-op.
        run_migrations(&conn).await?;

        assert_eq!(get_current_version(&conn).await?, SCHEMA_VERSION);
        Ok(())
    }

    #[tokio::test]
    async fn test_url_unique_constraint() -> Result<()> {
        let (pool, _dir) = create_test_database().await?;
        let conn = pool.get().await?;

        conn.execute("INSERT INTO sites (url) VALUES ('https://a.example')", ()).await?;
        let duplicate = conn
            .execute("INSERT INTO sites (url) VALUES ('https://a.example')", ())
            .await;

        let error = duplicate.expect_err("second insert must violate UNIQUE(url)");
        assert!(crate::database::error::is_unique_violation(&error));
        Ok(())
    }
}
