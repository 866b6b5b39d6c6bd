/// Streak and progress calculations
///
/// All metrics here are pure functions of a slice of completion logs and the
/// day the caller considers "today". Days are calendar days; the frequency and
/// target days of a habit do not change how they are counted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::{CompletionLog, HabitId};

/// Streak information for a habit
///
/// `current_streak` is the run of completed days ending today; a day without a
/// completed log (today included) ends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    /// Which habit this streak data belongs to
    pub habit_id: HabitId,
    /// Consecutive completed days ending today
    pub current_streak: u32,
    /// Longest run of consecutive completed days ever recorded
    pub longest_streak: u32,
    /// Most recent day with a completed log
    pub last_completed: Option<NaiveDate>,
    /// Total number of completed logs
    pub total_completions: u32,
}

impl Streak {
    /// Create a new empty streak for a habit
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completed: None,
            total_completions: 0,
        }
    }

    /// Calculate streak information from a habit's logs
    pub fn calculate(habit_id: HabitId, logs: &[CompletionLog], today: NaiveDate) -> Self {
        let days = completed_days(logs, &habit_id);
        if days.is_empty() {
            return Self::new(habit_id);
        }

        let mut sorted: Vec<NaiveDate> = days.iter().copied().collect();
        sorted.sort_unstable();

        Self {
            current_streak: streak_ending(&days, today),
            longest_streak: longest_run(&sorted),
            last_completed: sorted.last().copied(),
            total_completions: sorted.len() as u32,
            habit_id,
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }
}

/// Number of consecutive completed days for a habit, ending today
pub fn current_streak(logs: &[CompletionLog], habit_id: &HabitId, today: NaiveDate) -> u32 {
    streak_ending(&completed_days(logs, habit_id), today)
}

/// Completion percentage of a habit over the `window_days` days ending today
///
/// The window is `[today - (window_days - 1), today]`. The denominator is
/// always `window_days`, whatever the habit's schedule. A zero-length window
/// yields 0.
pub fn window_progress(
    logs: &[CompletionLog],
    habit_id: &HabitId,
    today: NaiveDate,
    window_days: u32,
) -> u8 {
    if window_days == 0 {
        return 0;
    }

    let start = today
        .checked_sub_signed(Duration::days(i64::from(window_days) - 1))
        .unwrap_or(NaiveDate::MIN);

    let completed = completed_days(logs, habit_id)
        .into_iter()
        .filter(|date| *date >= start && *date <= today)
        .count();

    let percent = (100.0 * completed as f64 / f64::from(window_days)).round();
    percent.min(100.0) as u8
}

/// Number of completed logs dated `date`, across all habits
pub fn completed_on(logs: &[CompletionLog], date: NaiveDate) -> usize {
    logs.iter()
        .filter(|log| log.completed && log.date == date)
        .count()
}

// Private helpers

fn completed_days(logs: &[CompletionLog], habit_id: &HabitId) -> HashSet<NaiveDate> {
    logs.iter()
        .filter(|log| log.completed && &log.habit_id == habit_id)
        .map(|log| log.date)
        .collect()
}

fn streak_ending(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut current = Some(today);

    while let Some(date) = current {
        if !days.contains(&date) {
            break;
        }
        streak += 1;
        current = date.pred_opt();
    }

    streak
}

/// Longest run of consecutive days in an ascending, duplicate-free list
fn longest_run(sorted: &[NaiveDate]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in sorted {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*date);
    }

    longest
}
