/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deleting a habit also
/// deletes every completion log recorded for it.

use serde::{Deserialize, Serialize};
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::{existing_habit_id, ToolError};

/// Parameters for deleting a habit
#[derive(Debug, Deserialize)]
pub struct DeleteHabitParams {
    pub habit_id: String,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub removed_logs: usize,
    pub message: String,
}

pub fn delete_habit<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = existing_habit_id(store, &params.habit_id)?;
    let name = store
        .habit(&habit_id)
        .map(|h| h.name.clone())
        .unwrap_or_default();
    let removed_logs = store.logs_for_habit(&habit_id).count();

    store.delete_habit(&habit_id)?;

    Ok(DeleteHabitResponse {
        success: true,
        removed_logs,
        message: format!(
            "🗑️ Deleted habit '{}' and {} completion record(s)",
            name, removed_logs
        ),
    })
}
