/// Change notifications emitted by the store
///
/// Every successful mutation produces one event after it has been written
/// through. Views subscribe to re-render; nothing in the store depends on
/// anyone listening.

use serde::Serialize;

use crate::domain::HabitId;
use crate::store::SyncOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    HabitAdded {
        habit_id: HabitId,
    },
    HabitUpdated {
        habit_id: HabitId,
    },
    HabitDeleted {
        habit_id: HabitId,
        removed_logs: usize,
    },
    CompletionToggled {
        habit_id: HabitId,
        date: chrono::NaiveDate,
        completed: bool,
    },
    SettingsUpdated,
    OrphansPruned {
        removed_logs: usize,
    },
    DataImported {
        habits: usize,
        logs: usize,
    },
    DataCleared,
    /// State was replaced by the sync recovery chain
    Restored {
        outcome: SyncOutcome,
    },
}

/// A subscriber callback
pub type Listener = Box<dyn Fn(&StoreEvent)>;
