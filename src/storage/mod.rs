/// Storage layer for persisting habit data
///
/// The store persists each collection as an independent JSON blob under a
/// fixed key. This module defines the key/value interface those blobs go
/// through and a SQLite implementation of it.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;

/// Key of the serialized habit list
pub const HABITS_KEY: &str = "habits";
/// Key of the serialized completion log list
pub const LOGS_KEY: &str = "habitLogs";
/// Key of the serialized settings object
pub const SETTINGS_KEY: &str = "appSettings";
/// Key of the full-state backup written by a successful sync
pub const BACKUP_KEY: &str = "habit-tracker-backup";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the durable key/value medium behind the store
///
/// Values are opaque strings; the store decides what they contain. A write
/// must be durable by the time it returns.
pub trait BlobStore {
    /// Read a blob, `None` if the key was never written or was removed
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Create or overwrite a blob
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a blob; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
