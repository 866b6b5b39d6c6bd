/// Tool for listing habits
///
/// This module implements the habit_list MCP tool, with the same search,
/// category and status filters as the habits view.

use serde::{Deserialize, Serialize};
use crate::analytics::{AnalyticsEngine, HabitFilter};
use crate::domain::{weekday_label, Habit, ALL_WEEKDAYS};
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::ToolError;

fn default_window() -> u32 {
    7
}

/// Parameters for listing habits
#[derive(Debug, Deserialize)]
pub struct ListHabitsParams {
    #[serde(flatten)]
    pub filter: HabitFilter,
    /// Days covered by each habit's progress figure
    #[serde(default = "default_window")]
    pub window_days: u32,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub frequency: String,
    pub target_days: Vec<u8>,
    /// Target days in words, e.g. "Mon, Wed, Fri"
    pub schedule: String,
    pub color: String,
    pub is_active: bool,
    pub scheduled_today: bool,
    pub completed_today: bool,
    pub current_streak: u32,
    pub progress: u8,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub total_habits: usize,
    pub categories: Vec<String>,
    pub message: String,
}

pub fn list_habits<S: BlobStore>(
    store: &HabitStore<S>,
    analytics: &AnalyticsEngine,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, ToolError> {
    let today = store.today();

    let habits: Vec<HabitSummary> = analytics
        .filter_habits(store, &params.filter)
        .into_iter()
        .map(|habit| HabitSummary {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            category: habit.category.clone(),
            frequency: habit.frequency.as_str().to_string(),
            target_days: habit.target_days.clone(),
            schedule: describe_schedule(habit),
            color: habit.color.clone(),
            is_active: habit.is_active,
            scheduled_today: habit.is_scheduled_on(today),
            completed_today: store.is_completed_on(&habit.id, today),
            current_streak: store.streak_for_habit(&habit.id),
            progress: store.habit_progress(&habit.id, params.window_days),
        })
        .collect();

    let message = match habits.len() {
        0 if store.habits().is_empty() => "No habits yet. Create one to get started!".to_string(),
        0 => "No habits match the current filters".to_string(),
        1 => "Found 1 habit".to_string(),
        n => format!("Found {} habits", n),
    };

    Ok(ListHabitsResponse {
        habits,
        total_habits: store.habits().len(),
        categories: analytics.categories(store),
        message,
    })
}

fn describe_schedule(habit: &Habit) -> String {
    if habit.target_days.is_empty() {
        return "Any day".to_string();
    }
    if ALL_WEEKDAYS.iter().all(|d| habit.target_days.contains(d)) {
        return "Every day".to_string();
    }
    habit
        .target_days
        .iter()
        .filter_map(|d| weekday_label(*d))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::StatusFilter;
    use crate::domain::{Frequency, HabitPatch, NewHabit};
    use crate::tools::test_support::{store, today};

    #[test]
    fn test_list_with_filters() {
        let mut store = store();
        let analytics = AnalyticsEngine::new();
        for (name, category) in [("Read", "Learning"), ("Run", "Exercise"), ("Podcast", "Learning")] {
            store
                .add_habit(NewHabit {
                    name: name.to_string(),
                    description: String::new(),
                    category: category.to_string(),
                    frequency: Frequency::Daily,
                    target_days: vec![0, 1, 2, 3, 4, 5, 6],
                    color: String::new(),
                    is_active: true,
                })
                .unwrap();
        }
        let run = store.habits()[1].id.clone();
        store.toggle_completion(&run, today(), None).unwrap();
        store
            .update_habit(&run, HabitPatch { is_active: Some(false), ..Default::default() })
            .unwrap();

        let params: ListHabitsParams = serde_json::from_value(serde_json::json!({})).unwrap();
        let all = list_habits(&store, &analytics, params).unwrap();
        assert_eq!(all.habits.len(), 3);
        assert_eq!(all.categories, vec!["Exercise", "Learning"]);
        assert_eq!(all.habits[0].schedule, "Every day");
        assert!(all.habits[0].scheduled_today);

        let params = ListHabitsParams {
            filter: HabitFilter { status: StatusFilter::Inactive, ..Default::default() },
            window_days: 7,
        };
        let inactive = list_habits(&store, &analytics, params).unwrap();
        assert_eq!(inactive.habits.len(), 1);
        assert!(inactive.habits[0].completed_today);
        assert_eq!(inactive.habits[0].progress, 14);

        let params = ListHabitsParams {
            filter: HabitFilter { search: Some("zzz".into()), ..Default::default() },
            window_days: 7,
        };
        let none = list_habits(&store, &analytics, params).unwrap();
        assert!(none.habits.is_empty());
        assert_eq!(none.total_habits, 3);
        assert!(none.message.contains("match"));
    }
}
