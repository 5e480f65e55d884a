//! Database lifecycle and schema migrations.
//!
//! The schema is a list of numbered [`Migration`]s. Opening a database
//! applies, in order, every migration above the highest version recorded in
//! `schema_version`; each one commits atomically together with its record.

use crate::error::DatabaseError;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use std::path::Path;
use std::str::FromStr;

use super::Database;

/// A schema version and the labelled statements that produce it
pub(crate) struct Migration {
    pub(crate) version: i64,
    pub(crate) steps: &'static [(&'static str, &'static str)],
}

/// Every schema version, oldest first
pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    steps: &[
        (
            "api_configs table",
            r#"
            CREATE TABLE api_configs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                base_url TEXT NOT NULL,
                api_key TEXT NOT NULL,
                api_user TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        ),
        (
            "response_templates table",
            r#"
            CREATE TABLE response_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                mapping_rules TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        ),
        (
            "task_presets table",
            r#"
            CREATE TABLE task_presets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        ),
        (
            "scrape_tasks table",
            r#"
            CREATE TABLE scrape_tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                model TEXT NOT NULL,
                thinking_level TEXT,
                platform_type TEXT NOT NULL DEFAULT 'standard',
                use_search INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                api_config_id INTEGER REFERENCES api_configs(id) ON DELETE SET NULL,
                template_id INTEGER REFERENCES response_templates(id) ON DELETE SET NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        ),
        (
            "scrape_tasks status index",
            "CREATE INDEX idx_scrape_tasks_status ON scrape_tasks(status)",
        ),
        (
            "task_entries table",
            r#"
            CREATE TABLE task_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL REFERENCES scrape_tasks(id) ON DELETE CASCADE,
                prompt TEXT NOT NULL,
                answer TEXT NOT NULL,
                raw_response TEXT NOT NULL,
                tokens_used INTEGER NOT NULL DEFAULT 0 CHECK (tokens_used >= 0),
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        ),
        (
            "task_entries order index",
            "CREATE INDEX idx_task_entries_task ON task_entries(task_id, id)",
        ),
    ],
}];

fn connection_failed(context: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| Error::Database(DatabaseError::ConnectionFailed(format!("{context}: {e}")))
}

fn migration_failed(context: String) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| Error::Database(DatabaseError::MigrationFailed(format!("{context}: {e}")))
}

/// WAL journal and enforced foreign keys; the file is created on first use
fn connect_options(path: &Path) -> Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .map_err(connection_failed("Failed to parse database path"))?;
    Ok(options
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal))
}

impl Database {
    /// Open (or create) the database at `path` and bring its schema up to date
    ///
    /// Missing parent directories are created.
    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to create database directory: {}",
                    e
                )))
            })?;
        }

        let pool = SqlitePool::connect_with(connect_options(path)?)
            .await
            .map_err(connection_failed("Failed to connect to database"))?;

        let db = Self { pool };
        db.migrate(MIGRATIONS).await?;
        Ok(db)
    }

    /// Highest applied schema version, 0 for a fresh file
    pub async fn schema_version(&self) -> Result<i64> {
        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to query schema version: {}",
                    e
                )))
            })?;
        Ok(version.unwrap_or(0))
    }

    /// Apply every migration newer than the recorded version
    pub(crate) async fn migrate(&self, migrations: &[Migration]) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(migration_failed("Failed to create schema_version table".to_string()))?;

        let current = self.schema_version().await?;
        for migration in migrations.iter().filter(|m| m.version > current) {
            self.apply(migration).await?;
        }
        Ok(())
    }

    /// Run one migration and record it; nothing is kept if any step fails
    async fn apply(&self, migration: &Migration) -> Result<()> {
        let version = migration.version;
        tracing::info!(version, "applying database migration");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(migration_failed(format!("Failed to begin migration v{version}")))?;

        for &(label, sql) in migration.steps {
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .map_err(migration_failed(format!("v{version}: failed to create {label}")))?;
        }

        sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(chrono::Utc::now().timestamp())
            .execute(&mut *tx)
            .await
            .map_err(migration_failed(format!("Failed to record migration v{version}")))?;

        tx.commit()
            .await
            .map_err(migration_failed(format!("Failed to commit migration v{version}")))?;

        tracing::info!(version, "database migration complete");
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
