/// CompletionLog entity for tracking habit completions
///
/// A log records whether a habit was done on one calendar day. There is at
/// most one log per (habit, day); toggling flips the existing row.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{HabitId, LogId};

/// A dated record of whether a habit was completed
///
/// `habit_id` is a weak reference: a log may outlive its habit until it is
/// pruned, and nothing breaks when it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionLog {
    /// Unique identifier for this log
    pub id: LogId,
    /// Which habit this log is for
    pub habit_id: HabitId,
    /// The day this log is about
    pub date: NaiveDate,
    /// False records an explicit "not done"
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CompletionLog {
    /// A fresh positive log, as created by the first toggle of a day
    pub fn completed(habit_id: HabitId, date: NaiveDate, notes: Option<String>) -> Self {
        Self {
            id: LogId::new(),
            habit_id,
            date,
            completed: true,
            notes,
        }
    }

    pub fn is_for(&self, habit_id: &HabitId, date: NaiveDate) -> bool {
        &self.habit_id == habit_id && self.date == date
    }

    /// Check if this log has non-blank notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// First log that repeats an earlier (habit, day) pair
pub fn find_duplicate_log(logs: &[CompletionLog]) -> Option<&CompletionLog> {
    let mut seen = HashSet::new();
    for log in logs {
        if !seen.insert((&log.habit_id, log.date)) {
            return Some(log);
        }
    }
    None
}

/// Keep one log per (habit, day), the last one listed wins
///
/// Surviving logs keep their relative order.
pub fn dedupe_logs(logs: Vec<CompletionLog>) -> Vec<CompletionLog> {
    let mut seen = HashSet::new();
    let mut kept: Vec<CompletionLog> = logs
        .into_iter()
        .rev()
        .filter(|log| seen.insert((log.habit_id.clone(), log.date)))
        .collect();
    kept.reverse();
    kept
}
