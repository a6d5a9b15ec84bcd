// ABOUTME: Storage layer for Storefront
// ABOUTME: SQLite pool setup, embedded migrations, storage errors and the identity mirror

use thiserror::Error;

pub mod db;
pub mod users;

pub use db::{open_database, open_database_at, open_in_memory, run_migrations, DatabaseOptions};
pub use users::{User, UserStorage};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Duplicate value: {0}")]
    Duplicate(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Map `RowNotFound` to `NotFound`, keep everything else as a sqlx error
    pub fn from_query(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            other => StorageError::Sqlx(other),
        }
    }
}

/// Whether `err` is a unique-constraint violation mentioning `column`.
///
/// SQLite reports these as `UNIQUE constraint failed: <table>.<column>`.
pub fn is_unique_violation_on(err: &sqlx::Error, column: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.message().contains(column)
        }
        _ => false,
    }
}
