/// MCP tools for habit management
///
/// Each tool is the client-facing side of one store operation. Tools parse
/// and validate client input the way a form would, call the store, and
/// describe the result. The store itself never sees unvalidated drafts.

pub mod create;
pub mod data;
pub mod delete;
pub mod list;
pub mod settings;
pub mod stats;
pub mod status;
pub mod toggle;
pub mod update;

// Re-export tool functions for easy access
pub use create::*;
pub use data::*;
pub use delete::*;
pub use list::*;
pub use settings::*;
pub use stats::*;
pub use status::*;
pub use toggle::*;
pub use update::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{DomainError, Frequency, HabitId};
use crate::storage::BlobStore;
use crate::store::{HabitStore, StoreError, TransferError};

/// Errors reported back to the client as tool failures
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    Validation(#[from] DomainError),

    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("{0}")]
    Transfer(#[from] TransferError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Parse a `YYYY-MM-DD` date, defaulting to the store's today
pub(crate) fn parse_date<S: BlobStore>(
    store: &HabitStore<S>,
    date: Option<&str>,
) -> Result<NaiveDate, ToolError> {
    match date.map(str::trim) {
        None | Some("") => Ok(store.today()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            ToolError::from(DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", s)))
        }),
    }
}

/// Parse a frequency name, listing the valid options on failure
pub(crate) fn parse_frequency(s: &str) -> Result<Frequency, ToolError> {
    Frequency::parse(s).ok_or_else(|| {
        ToolError::from(DomainError::InvalidFrequency(format!(
            "Invalid frequency '{}'. Valid options: daily, weekly, monthly",
            s
        )))
    })
}

/// Resolve a client-supplied id to a habit that exists
pub(crate) fn existing_habit_id<S: BlobStore>(
    store: &HabitStore<S>,
    habit_id: &str,
) -> Result<HabitId, ToolError> {
    let habit_id = HabitId::from_string(habit_id.trim());
    if store.habit(&habit_id).is_none() {
        return Err(ToolError::HabitNotFound(habit_id.to_string()));
    }
    Ok(habit_id)
}
