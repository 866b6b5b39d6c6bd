/// Tool for the statistics view
///
/// This module implements the habit_stats MCP tool.

use serde::{Deserialize, Serialize};
use crate::analytics::{AnalyticsEngine, CategoryShare, DailyCompletion, DataStats, HabitProgressRow, StatsSummary};
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::ToolError;

fn default_window() -> u32 {
    30
}

fn default_days() -> u32 {
    14
}

/// Parameters for the statistics view
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Days covered by the progress figures
    #[serde(default = "default_window")]
    pub window_days: u32,
    /// Length of the daily completion series, at most a year
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for StatsParams {
    fn default() -> Self {
        Self {
            window_days: default_window(),
            days: default_days(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub summary: StatsSummary,
    pub habits: Vec<HabitProgressRow>,
    pub daily: Vec<DailyCompletion>,
    pub categories: Vec<CategoryShare>,
    pub data: DataStats,
    pub message: String,
}

pub fn get_stats<S: BlobStore>(
    store: &HabitStore<S>,
    analytics: &AnalyticsEngine,
    params: StatsParams,
) -> Result<StatsResponse, ToolError> {
    let summary = analytics.stats_summary(store, params.window_days);
    let message = format!(
        "📊 {} active habits, {}% average progress over {} days, best streak {} days",
        summary.active_habits, summary.average_progress, summary.window_days, summary.best_streak
    );

    Ok(StatsResponse {
        habits: analytics.habit_progress_rows(store, params.window_days),
        daily: analytics.daily_completion(store, params.days),
        categories: analytics.category_breakdown(store),
        data: analytics.data_stats(store),
        summary,
        message,
    })
}
