//! Configuration management for the circulation binary.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary loads a `.env` file first, so its entries count as environment
//! variables.

use std::env;
use std::path::PathBuf;

/// Where the library's files live, and how loudly to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Catalog file (`CIRCULATION_BOOKS_PATH`)
    pub books_path: PathBuf,
    /// Directory file (`CIRCULATION_USERS_PATH`)
    pub users_path: PathBuf,
    /// Transaction log (`CIRCULATION_TRANSACTIONS_PATH`)
    pub transactions_path: PathBuf,
    /// Log level when `RUST_LOG` is unset (`CIRCULATION_LOG_LEVEL`)
    pub log_level: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            books_path: PathBuf::from("books.txt"),
            users_path: PathBuf::from("users.txt"),
            transactions_path: PathBuf::from("transactions.txt"),
            log_level: "info".to_string(),
        }
    }
}

impl LibraryConfig {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            books_path: lookup("CIRCULATION_BOOKS_PATH")
                .map_or(defaults.books_path, PathBuf::from),
            users_path: lookup("CIRCULATION_USERS_PATH")
                .map_or(defaults.users_path, PathBuf::from),
            transactions_path: lookup("CIRCULATION_TRANSACTIONS_PATH")
                .map_or(defaults.transactions_path, PathBuf::from),
            log_level: lookup("CIRCULATION_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}
