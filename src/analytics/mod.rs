/// Analytics engine for dashboard and statistics views
///
/// These are read-only aggregates over the store: today's summary, the
/// per-habit progress table, the daily completion series and the category
/// breakdown. Unless stated otherwise only active habits are considered.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{completed_on, Habit};
use crate::storage::BlobStore;
use crate::store::HabitStore;

/// Which habits a list view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

/// Search and filter criteria for the habit list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HabitFilter {
    /// Case-insensitive match against name or description
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category match
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl HabitFilter {
    pub fn matches(&self, habit: &Habit) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                habit.name.to_lowercase().contains(&term)
                    || habit.description.to_lowercase().contains(&term)
            }
        };

        let matches_category = self
            .category
            .as_deref()
            .map_or(true, |category| habit.category == category);

        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => habit.is_active,
            StatusFilter::Inactive => !habit.is_active,
        };

        matches_search && matches_category && matches_status
    }
}

/// Dashboard header numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub active_habits: usize,
    pub completed_today: usize,
    /// Completed today over active habits, as a rounded percentage
    pub completion_rate: u32,
    pub message: String,
}

/// Headline numbers for the statistics view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub window_days: u32,
    pub active_habits: usize,
    pub total_completed_logs: usize,
    pub best_streak: u32,
    pub average_progress: u8,
}

/// One row of the per-habit progress table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitProgressRow {
    pub habit_id: String,
    pub name: String,
    pub category: String,
    pub color: String,
    pub progress: u8,
    pub streak: u32,
}

/// Completions on one day of the daily series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCompletion {
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
    pub rate: u32,
}

/// Share of active habits in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    pub percentage: u32,
}

/// Storage overview shown on the settings view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataStats {
    pub total_habits: usize,
    pub active_habits: usize,
    pub total_logs: usize,
    pub completed_logs: usize,
    /// Size of the serialized state in bytes
    pub storage_size: usize,
}

/// Longest daily series `daily_completion` produces
pub const MAX_SERIES_DAYS: u32 = 365;

/// Analytics engine for processing habit data
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new() -> Self {
        Self
    }

    pub fn today_summary<S: BlobStore>(&self, store: &HabitStore<S>) -> TodaySummary {
        let active_habits = store.active_habits().count();
        let completed_today = store.today_completed_count();
        let completion_rate = percentage(completed_today, active_habits);

        TodaySummary {
            date: store.today(),
            active_habits,
            completed_today,
            completion_rate,
            message: daily_message(completion_rate).to_string(),
        }
    }

    pub fn stats_summary<S: BlobStore>(&self, store: &HabitStore<S>, window_days: u32) -> StatsSummary {
        let active: Vec<&Habit> = store.active_habits().collect();

        let best_streak = active
            .iter()
            .map(|h| store.streak_for_habit(&h.id))
            .max()
            .unwrap_or(0);

        let average_progress = if active.is_empty() {
            0
        } else {
            let total: u32 = active
                .iter()
                .map(|h| u32::from(store.habit_progress(&h.id, window_days)))
                .sum();
            (f64::from(total) / active.len() as f64).round() as u8
        };

        StatsSummary {
            window_days,
            active_habits: active.len(),
            total_completed_logs: store.logs().iter().filter(|log| log.completed).count(),
            best_streak,
            average_progress,
        }
    }

    pub fn habit_progress_rows<S: BlobStore>(
        &self,
        store: &HabitStore<S>,
        window_days: u32,
    ) -> Vec<HabitProgressRow> {
        store
            .active_habits()
            .map(|habit| HabitProgressRow {
                habit_id: habit.id.to_string(),
                name: habit.name.clone(),
                category: habit.category.clone(),
                color: habit.color.clone(),
                progress: store.habit_progress(&habit.id, window_days),
                streak: store.streak_for_habit(&habit.id),
            })
            .collect()
    }

    /// Completions per day for the last `days` days, oldest first
    ///
    /// The series is capped at `MAX_SERIES_DAYS`.
    pub fn daily_completion<S: BlobStore>(&self, store: &HabitStore<S>, days: u32) -> Vec<DailyCompletion> {
        let today = store.today();
        let total = store.active_habits().count();
        let days = days.min(MAX_SERIES_DAYS);

        (0..i64::from(days))
            .rev()
            .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
            .map(|date| {
                let completed = completed_on(store.logs(), date);
                DailyCompletion {
                    date,
                    completed,
                    total,
                    rate: percentage(completed, total),
                }
            })
            .collect()
    }

    /// Active habits per category, sorted by category name
    pub fn category_breakdown<S: BlobStore>(&self, store: &HabitStore<S>) -> Vec<CategoryShare> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for habit in store.active_habits() {
            *counts.entry(habit.category.as_str()).or_default() += 1;
        }

        let total: usize = counts.values().sum();
        counts
            .into_iter()
            .map(|(category, count)| CategoryShare {
                category: category.to_string(),
                count,
                percentage: percentage(count, total),
            })
            .collect()
    }

    pub fn data_stats<S: BlobStore>(&self, store: &HabitStore<S>) -> DataStats {
        let storage_size = serde_json::json!({
            "habits": store.habits(),
            "habitLogs": store.logs(),
            "settings": store.settings(),
        })
        .to_string()
        .len();

        DataStats {
            total_habits: store.habits().len(),
            active_habits: store.active_habits().count(),
            total_logs: store.logs().len(),
            completed_logs: store.logs().iter().filter(|log| log.completed).count(),
            storage_size,
        }
    }

    /// Habits matching `filter`, in store order
    pub fn filter_habits<'a, S: BlobStore>(
        &self,
        store: &'a HabitStore<S>,
        filter: &HabitFilter,
    ) -> Vec<&'a Habit> {
        store.habits().iter().filter(|h| filter.matches(h)).collect()
    }

    /// Distinct categories in use, sorted
    pub fn categories<S: BlobStore>(&self, store: &HabitStore<S>) -> Vec<String> {
        let mut categories: Vec<String> = store.habits().iter().map(|h| h.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounded `part / whole` percentage, 0 when `whole` is 0
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

fn daily_message(completion_rate: u32) -> &'static str {
    match completion_rate {
        100.. => "Excellent! You've completed all your habits today.",
        75..=99 => "Very good! You're close to completing all your habits.",
        50..=74 => "Good progress, keep it up!",
        25..=49 => "You've made a good start, keep going!",
        _ => "It's a good time to start on your habits!",
    }
}
