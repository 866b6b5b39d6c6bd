/// Habit entity and related functionality
///
/// This module defines the core Habit struct, the data a caller supplies to
/// create one, the partial update applied by `HabitStore::update_habit`, and
/// the form-level draft validation that runs before anything reaches the store.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{weekday_index, DomainError, Frequency, HabitId, ALL_WEEKDAYS};

/// Categories offered to the user when creating a habit
pub const SUGGESTED_CATEGORIES: [&str; 10] = [
    "Health",
    "Exercise",
    "Nutrition",
    "Productivity",
    "Learning",
    "Mindfulness",
    "Relationships",
    "Finance",
    "Hobbies",
    OTHER_CATEGORY,
];

/// Selecting this category means the draft's custom category is used instead
pub const OTHER_CATEGORY: &str = "Other";

/// Display colors offered to the user; the first one is the default
pub const HABIT_COLORS: [&str; 10] = [
    "#ef4444", // red
    "#f97316", // orange
    "#eab308", // yellow
    "#22c55e", // green
    "#06b6d4", // cyan
    "#3b82f6", // blue
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#64748b", // slate
    "#78716c", // stone
];

fn default_true() -> bool {
    true
}

/// A habit represents something the user wants to do regularly
///
/// This is the core entity in our system. `id` and `created_at` are set once
/// by the store and never change afterwards; everything else is user data the
/// store keeps exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-text grouping label
    pub category: String,
    pub frequency: Frequency,
    /// Weekday indices (0 = Sunday) the habit is expected on
    #[serde(default)]
    pub target_days: Vec<u8>,
    /// Display color, opaque to the engine
    #[serde(default)]
    pub color: String,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Inactive habits keep their history but drop out of daily views
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Habit {
    /// Build a habit from caller data, assigning a fresh id
    pub fn create(data: NewHabit, created_at: DateTime<Utc>) -> Self {
        Self {
            id: HabitId::new(),
            name: data.name,
            description: data.description,
            category: data.category,
            frequency: data.frequency,
            target_days: data.target_days,
            color: data.color,
            created_at,
            is_active: data.is_active,
        }
    }

    /// Check whether the habit is expected on the given day
    ///
    /// A habit without target days is expected on any day.
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.target_days.is_empty() || self.target_days.contains(&weekday_index(date))
    }
}

/// Everything needed to create a habit except the id and creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub target_days: Vec<u8>,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Fields to merge into an existing habit
///
/// `id` and `created_at` are immutable and have no field here; a client
/// that sends them has them ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub target_days: Option<Vec<u8>>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.frequency.is_none()
            && self.target_days.is_none()
            && self.color.is_none()
            && self.is_active.is_none()
    }

    /// Shallow-merge the given fields into `habit`
    pub fn apply_to(self, habit: &mut Habit) {
        if let Some(name) = self.name {
            habit.name = name;
        }
        if let Some(description) = self.description {
            habit.description = description;
        }
        if let Some(category) = self.category {
            habit.category = category;
        }
        if let Some(frequency) = self.frequency {
            habit.frequency = frequency;
        }
        if let Some(target_days) = self.target_days {
            habit.target_days = target_days;
        }
        if let Some(color) = self.color {
            habit.color = color;
        }
        if let Some(is_active) = self.is_active {
            habit.is_active = is_active;
        }
    }
}

/// Raw habit form input, validated before it is handed to the store
///
/// The store itself accepts any `NewHabit`; this is where the rules a user
/// sees in the form live.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Used when `category` is "Other"
    #[serde(default)]
    pub custom_category: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub target_days: Vec<u8>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl HabitDraft {
    /// Validate the draft and turn it into store input
    pub fn validate(self) -> Result<NewHabit, DomainError> {
        let name = self.name.trim();
        Self::validate_name(name)?;

        let category = Self::resolve_category(&self.category, &self.custom_category)?;

        let target_days = match self.frequency {
            Frequency::Daily => ALL_WEEKDAYS.to_vec(),
            Frequency::Weekly | Frequency::Monthly => {
                Self::validate_target_days(&self.target_days, self.frequency)?
            }
        };

        Ok(NewHabit {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            category,
            frequency: self.frequency,
            target_days,
            color: self.color.unwrap_or_else(|| HABIT_COLORS[0].to_string()),
            is_active: self.is_active,
        })
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if name.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn resolve_category(category: &str, custom: &str) -> Result<String, DomainError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(DomainError::InvalidCategory(
                "Select a category".to_string()
            ));
        }

        if category.eq_ignore_ascii_case(OTHER_CATEGORY) {
            let custom = custom.trim();
            if custom.is_empty() {
                return Err(DomainError::InvalidCategory(
                    "Custom category name cannot be empty".to_string()
                ));
            }
            return Ok(custom.to_string());
        }

        Ok(category.to_string())
    }

    fn validate_target_days(days: &[u8], frequency: Frequency) -> Result<Vec<u8>, DomainError> {
        if let Some(bad) = days.iter().find(|d| **d > 6) {
            return Err(DomainError::InvalidTargetDays(format!(
                "Weekday index must be 0-6, got {}",
                bad
            )));
        }

        if frequency == Frequency::Weekly && days.is_empty() {
            return Err(DomainError::InvalidTargetDays(
                "Select at least one day of the week".to_string()
            ));
        }

        let mut days = days.to_vec();
        days.sort_unstable();
        days.dedup();
        Ok(days)
    }
}
