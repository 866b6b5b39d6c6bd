/// Tool for checking habit status and streaks
///
/// This module implements the habit_status MCP tool: today's dashboard
/// numbers plus streak details for one habit or every active habit.

use serde::{Deserialize, Serialize};
use crate::analytics::{AnalyticsEngine, TodaySummary};
use crate::domain::Habit;
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::{existing_habit_id, ToolError};

fn default_window() -> u32 {
    7
}

/// Parameters for checking habit status
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    /// If omitted, reports every active habit
    pub habit_id: Option<String>,
    #[serde(default = "default_window")]
    pub window_days: u32,
}

/// Information about a single habit's status
#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit_id: String,
    pub name: String,
    pub completed_today: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub last_completed: Option<String>,
    pub progress: u8,
    pub status: String,
    pub message: String,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub today: TodaySummary,
    pub habits: Vec<HabitStatus>,
    pub message: String,
}

pub fn get_habit_status<S: BlobStore>(
    store: &HabitStore<S>,
    analytics: &AnalyticsEngine,
    params: StatusParams,
) -> Result<StatusResponse, ToolError> {
    let habits: Vec<&Habit> = match params.habit_id.as_deref() {
        Some(id) => {
            let habit_id = existing_habit_id(store, id)?;
            store.habit(&habit_id).into_iter().collect()
        }
        None => store.active_habits().collect(),
    };

    let today = store.today();
    let statuses = habits
        .into_iter()
        .map(|habit| {
            let streak = store.streak_summary(&habit.id);
            let completed_today = store.is_completed_on(&habit.id, today);

            let status = if !habit.is_active {
                "paused"
            } else if completed_today {
                "done"
            } else if streak.total_completions == 0 {
                "new"
            } else if streak.last_completed == today.pred_opt() {
                "at_risk"
            } else {
                "missed"
            };

            HabitStatus {
                habit_id: habit.id.to_string(),
                name: habit.name.clone(),
                completed_today,
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                total_completions: streak.total_completions,
                last_completed: streak.last_completed.map(|d| d.to_string()),
                progress: store.habit_progress(&habit.id, params.window_days),
                status: status.to_string(),
                message: streak.motivational_message(),
            }
        })
        .collect();

    let summary = analytics.today_summary(store);
    let message = format!(
        "{} of {} habits done today ({}%). {}",
        summary.completed_today, summary.active_habits, summary.completion_rate, summary.message
    );

    Ok(StatusResponse {
        today: summary,
        habits: statuses,
        message,
    })
}
