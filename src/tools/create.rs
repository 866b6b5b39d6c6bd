/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool. It plays the part of the
/// habit form: the draft is validated here before the store sees it.

use serde::{Deserialize, Serialize};
use crate::domain::HabitDraft;
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::{parse_frequency, ToolError};

fn default_frequency() -> String {
    "daily".to_string()
}

fn default_true() -> bool {
    true
}

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Name to use when `category` is "Other"
    #[serde(default)]
    pub custom_category: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    /// Weekday indices, 0 = Sunday
    #[serde(default)]
    pub target_days: Vec<u8>,
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: String,
    pub message: String,
}

/// Validate the draft and create the habit
pub fn create_habit<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let frequency = parse_frequency(&params.frequency)?;

    let new_habit = HabitDraft {
        name: params.name,
        description: params.description,
        category: params.category,
        custom_category: params.custom_category,
        frequency,
        target_days: params.target_days,
        color: params.color,
        is_active: params.is_active,
    }
    .validate()?;

    let habit = store.add_habit(new_habit)?;

    Ok(CreateHabitResponse {
        success: true,
        habit_id: habit.id.to_string(),
        message: format!("✅ Created habit '{}'! Ready to start your streak!", habit.name),
    })
}
