/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify
/// existing habit properties like name, frequency, target days, etc.

use serde::{Deserialize, Serialize};
use crate::domain::{DomainError, Frequency, HabitPatch};
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::{existing_habit_id, parse_frequency, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize)]
pub struct UpdateHabitParams {
    pub habit_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub target_days: Option<Vec<u8>>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Update an existing habit
///
/// The same rules as the create form apply to the fields being changed.
pub fn update_habit<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = existing_habit_id(store, &params.habit_id)?;

    let name = match params.name {
        Some(name) if name.trim().is_empty() => {
            return Err(DomainError::InvalidHabitName("Habit name cannot be empty".to_string()).into());
        }
        other => other.map(|n| n.trim().to_string()),
    };

    let frequency = params.frequency.as_deref().map(parse_frequency).transpose()?;

    if let Some(days) = &params.target_days {
        if days.iter().any(|d| *d > 6) {
            return Err(DomainError::InvalidTargetDays("Weekday index must be 0-6".to_string()).into());
        }
    }

    // Check the schedule the habit will end up with, not just the patch
    if let Some(habit) = store.habit(&habit_id) {
        let resulting_frequency = frequency.unwrap_or(habit.frequency);
        let resulting_days = params.target_days.as_ref().unwrap_or(&habit.target_days);
        if resulting_frequency == Frequency::Weekly && resulting_days.is_empty() {
            return Err(DomainError::InvalidTargetDays(
                "Select at least one day of the week".to_string()
            ).into());
        }
    }

    let patch = HabitPatch {
        name,
        description: params.description,
        category: params.category,
        frequency,
        target_days: params.target_days,
        color: params.color,
        is_active: params.is_active,
    };

    if patch.is_empty() {
        return Ok(UpdateHabitResponse {
            success: true,
            message: "Nothing to update".to_string(),
        });
    }

    store.update_habit(&habit_id, patch)?;

    let name = store
        .habit(&habit_id)
        .map(|h| h.name.clone())
        .unwrap_or_default();

    let message = match params.is_active {
        Some(false) => format!("⏸️ Paused habit '{}'", name),
        Some(true) => format!("▶️ Reactivated habit '{}'", name),
        None => format!("✅ Updated habit '{}'", name),
    };

    Ok(UpdateHabitResponse {
        success: true,
        message,
    })
}
