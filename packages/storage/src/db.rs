// ABOUTME: Database connection management and schema migrations
// ABOUTME: Opens the shared SQLite pool in WAL mode and applies embedded migrations

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{StorageError, StorageResult};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connection pool tuning
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long a writer waits for the write lock before giving up
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

/// Open the database at `database_path` (or the default location) and migrate it
pub async fn open_database(database_path: Option<PathBuf>) -> StorageResult<SqlitePool> {
    let database_path = database_path.unwrap_or_else(storefront_core::database_file);
    open_database_at(&database_path, &DatabaseOptions::default()).await
}

pub async fn open_database_at(
    database_path: &Path,
    options: &DatabaseOptions,
) -> StorageResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    debug!("Connecting to database: {}", database_path.display());

    let connect_options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(options.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(options.acquire_timeout)
        .connect_with(connect_options)
        .await?;

    info!("Database connection established");

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Open a migrated in-memory database.
///
/// The pool holds exactly one connection that never expires, because every
/// SQLite in-memory connection is its own database.
pub async fn open_in_memory() -> StorageResult<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| StorageError::Database(e.to_string()))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    MIGRATOR.run(pool).await?;
    debug!("Database migrations completed");
    Ok(())
}
