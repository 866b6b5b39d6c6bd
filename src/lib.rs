/// Public library interface for the habit store
///
/// The crate is built around `HabitStore`, an in-memory habit tracker that
/// writes every change through to blob storage and can recover from corrupt
/// data using its last backup. `HabitTrackerServer` wires a SQLite-backed
/// store to the MCP server so that clients can drive it over stdio.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod analytics;
pub mod clock;
pub mod domain;
pub mod mcp;
pub mod storage;
pub mod store;
pub mod tools;

// Re-export public modules and types
pub use analytics::AnalyticsEngine;
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::*;
pub use storage::{BlobStore, SqliteBlobStore, StorageError};
pub use store::{
    Backup, Connectivity, ConnectivityMonitor, ExportDocument, HabitStore, ImportDocument,
    StoreError, StoreEvent, SyncOutcome, TransferError,
};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit store and analytics behind the MCP server
pub struct HabitTrackerServer {
    store: HabitStore<SqliteBlobStore>,
    analytics: AnalyticsEngine,
}

impl HabitTrackerServer {
    /// Open the habit store kept in the SQLite database at `db_path`
    ///
    /// The schema is created if the file is new. When `recover` is set, a
    /// corrupt collection is restored from the backup instead of failing
    /// startup.
    pub fn new(db_path: PathBuf, recover: bool) -> Result<Self, ServerError> {
        info!("Initializing habit store with database: {:?}", db_path);

        let storage = SqliteBlobStore::new(db_path)?;

        let store = if recover {
            let (store, outcome) = HabitStore::load_or_recover(storage, SystemClock)?;
            if let Some(outcome) = outcome {
                warn!("Stored data was corrupt at startup: {:?}", outcome);
            }
            store
        } else {
            HabitStore::load(storage, SystemClock)?
        };

        Ok(Self::from_store(store))
    }

    /// Wrap an already loaded store
    pub fn from_store(mut store: HabitStore<SqliteBlobStore>) -> Self {
        store.subscribe(|event| debug!("Store changed: {:?}", event));

        Self {
            store,
            analytics: AnalyticsEngine::new(),
        }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Returns once stdin is closed.
    pub async fn run(self) -> Result<(), ServerError> {
        info!(
            "Server started successfully, found {} existing habits",
            self.store.habits().len()
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn store(&self) -> &HabitStore<SqliteBlobStore> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HabitStore<SqliteBlobStore> {
        &mut self.store
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }
}
