// ABOUTME: Default on-disk locations for Storefront data
// ABOUTME: Resolves the data directory under the home directory and the database file in it

use std::env;
use std::path::PathBuf;

/// Get the path to the Storefront directory (~/.storefront)
pub fn storefront_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".storefront")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".storefront")
    }
}

/// Get the path to the default database file (~/.storefront/storefront.db)
pub fn database_file() -> PathBuf {
    storefront_dir().join("storefront.db")
}
