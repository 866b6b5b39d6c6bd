/// Export, import and clear
///
/// Export produces a self-describing JSON document of the whole state. Import
/// accepts such a document only if it carries all three collections, and then
/// replaces the store's state with it in one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::domain::{find_duplicate_log, CompletionLog, Habit, Settings};
use crate::storage::{BlobStore, BACKUP_KEY};
use crate::store::{HabitStore, PersistedState, StoreError, StoreEvent};

/// Format version written into every export
pub const EXPORT_VERSION: &str = "1.0";

/// Errors raised while reading or writing transfer documents
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid import format: {0}")]
    InvalidFormat(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A downloadable snapshot of the whole state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub habits: Vec<Habit>,
    pub habit_logs: Vec<CompletionLog>,
    pub settings: Settings,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportDocument {
    pub fn to_json_pretty(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested download name, e.g. `habit-tracker-backup-2024-06-10.json`
    pub fn file_name(&self) -> String {
        format!("habit-tracker-backup-{}.json", self.export_date.date_naive())
    }
}

/// A parsed, validated import
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    pub habits: Vec<Habit>,
    pub habit_logs: Vec<CompletionLog>,
    pub settings: Settings,
    #[serde(default)]
    pub version: Option<String>,
}

impl ImportDocument {
    const REQUIRED_KEYS: [&'static str; 3] = ["habits", "habitLogs", "settings"];

    /// Parse an import document
    ///
    /// The document must be a JSON object with non-null `habits`,
    /// `habitLogs` and `settings`, holding at most one log per habit and
    /// day. Anything else is rejected whole.
    pub fn parse(json: &str) -> Result<Self, TransferError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| TransferError::InvalidFormat(format!("not a JSON document ({})", e)))?;

        let Some(object) = value.as_object() else {
            return Err(TransferError::InvalidFormat(
                "expected a JSON object".to_string(),
            ));
        };

        for key in Self::REQUIRED_KEYS {
            if object.get(key).map_or(true, Value::is_null) {
                return Err(TransferError::InvalidFormat(format!("missing '{}'", key)));
            }
        }

        let document: Self = serde_json::from_value(value)
            .map_err(|e| TransferError::InvalidFormat(e.to_string()))?;

        if let Some(log) = find_duplicate_log(&document.habit_logs) {
            return Err(TransferError::InvalidFormat(format!(
                "more than one log for habit '{}' on {}",
                log.habit_id, log.date
            )));
        }

        Ok(document)
    }
}

/// Counts reported back after an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub habits: usize,
    pub logs: usize,
}

impl<S: BlobStore> HabitStore<S> {
    /// Snapshot the current state for download
    pub fn export(&self) -> ExportDocument {
        ExportDocument {
            habits: self.habits.clone(),
            habit_logs: self.logs.clone(),
            settings: self.settings.clone(),
            export_date: self.clock.now(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Replace all three collections with an imported document
    pub fn import(&mut self, document: ImportDocument) -> Result<ImportSummary, StoreError> {
        let summary = ImportSummary {
            habits: document.habits.len(),
            logs: document.habit_logs.len(),
        };

        self.replace_state(PersistedState {
            habits: document.habits,
            logs: document.habit_logs,
            settings: document.settings,
        })?;

        info!("Imported {} habits and {} logs", summary.habits, summary.logs);
        self.emit(StoreEvent::DataImported {
            habits: summary.habits,
            logs: summary.logs,
        });
        Ok(summary)
    }

    /// Delete every persisted blob except the backup and reset to an empty state
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        for key in self.storage.keys()? {
            if key != BACKUP_KEY {
                self.storage.remove(&key)?;
            }
        }

        self.habits.clear();
        self.logs.clear();
        self.settings = Settings::default();

        info!("Cleared all habit data");
        self.emit(StoreEvent::DataCleared);
        Ok(())
    }
}
