/// Tool for marking habits done or undone
///
/// This module implements the habit_toggle MCP tool. Calling it twice for
/// the same habit and day undoes the first call.

use serde::{Deserialize, Serialize};
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::{existing_habit_id, parse_date, ToolError};

/// Parameters for toggling a completion
#[derive(Debug, Deserialize)]
pub struct ToggleParams {
    pub habit_id: String,
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
    pub notes: Option<String>,
}

/// Response from toggling a completion
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub date: String,
    pub completed: bool,
    pub current_streak: u32,
    pub message: String,
}

pub fn toggle_completion<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: ToggleParams,
) -> Result<ToggleResponse, ToolError> {
    let habit_id = existing_habit_id(store, &params.habit_id)?;
    let date = parse_date(store, params.date.as_deref())?;
    let notes = params.notes.filter(|n| !n.trim().is_empty());

    let completed = store.toggle_completion(&habit_id, date, notes)?;
    let streak = store.streak_summary(&habit_id);

    let name = store
        .habit(&habit_id)
        .map(|h| h.name.as_str())
        .unwrap_or_default();

    let message = if completed {
        format!(
            "🎉 Marked '{}' done for {}. {}",
            name,
            date,
            streak.motivational_message()
        )
    } else {
        format!("↩️ Unmarked '{}' for {}", name, date)
    };

    Ok(ToggleResponse {
        success: true,
        date: date.to_string(),
        completed,
        current_streak: streak.current_streak,
        message,
    })
}
