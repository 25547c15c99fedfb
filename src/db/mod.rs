//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data.

mod arrangements;
mod organization;
mod profiles;
mod repository;

pub use arrangements::ArrangementScope;
pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes if they do not exist yet.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS positions (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            department_id TEXT REFERENCES departments(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS offices (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            city TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            patronymic TEXT,
            pin TEXT NOT NULL UNIQUE,
            birth_date TEXT,
            gender TEXT,
            position_id TEXT REFERENCES positions(id) ON DELETE SET NULL,
            office_id TEXT REFERENCES offices(id) ON DELETE SET NULL,
            email TEXT,
            phone_number_work TEXT DEFAULT '-',
            phone_number_mobile TEXT DEFAULT '-',
            phone_number_government TEXT DEFAULT '-',
            office_number TEXT DEFAULT '-',
            photo_path TEXT,
            bio TEXT DEFAULT '-',
            status TEXT NOT NULL DEFAULT 'active',
            is_inspector INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS arrangements (
            id TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            position_id TEXT REFERENCES positions(id) ON DELETE SET NULL,
            responsible_auditor_id TEXT REFERENCES profiles(id) ON DELETE SET NULL,
            audit_activity TEXT NOT NULL DEFAULT '',
            audit_purpose TEXT NOT NULL DEFAULT '',
            order_number TEXT NOT NULL DEFAULT '',
            order_period TEXT NOT NULL DEFAULT '',
            audit_address TEXT NOT NULL DEFAULT '',
            leave_status TEXT NOT NULL DEFAULT '',
            presence_check TEXT NOT NULL DEFAULT '',
            not_started TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL,
            UNIQUE (profile_id, date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_profiles_last_name ON profiles(last_name, first_name);
        CREATE INDEX IF NOT EXISTS idx_profiles_office ON profiles(office_id);
        CREATE INDEX IF NOT EXISTS idx_positions_department ON positions(department_id);
        CREATE INDEX IF NOT EXISTS idx_arrangements_date ON arrangements(date);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
