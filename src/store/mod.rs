/// The habit store
///
/// `HabitStore` owns the habits, completion logs and settings for the life of
/// the process. Reads are served from memory; every mutation updates memory
/// and then writes the touched collection through to blob storage before it
/// returns, so a reload always sees the latest state.

pub mod events;
pub mod sync;
pub mod transfer;

pub use events::*;
pub use sync::*;
pub use transfer::*;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::domain::{
    self, CompletionLog, Habit, HabitId, HabitPatch, NewHabit, Settings, SettingsPatch, Streak,
};
use crate::storage::{BlobStore, StorageError, HABITS_KEY, LOGS_KEY, SETTINGS_KEY};

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Persisted '{key}' data is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// The three persisted collections, as read from storage
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PersistedState {
    pub habits: Vec<Habit>,
    pub logs: Vec<CompletionLog>,
    pub settings: Settings,
}

/// In-memory habit state with write-through persistence
pub struct HabitStore<S: BlobStore> {
    storage: S,
    clock: Box<dyn Clock>,
    habits: Vec<Habit>,
    logs: Vec<CompletionLog>,
    settings: Settings,
    listeners: Vec<Listener>,
}

impl<S: BlobStore> HabitStore<S> {
    /// Load the store from storage using the system clock
    pub fn open(storage: S) -> Result<Self, StoreError> {
        Self::load(storage, SystemClock)
    }

    /// Load all three collections from storage
    ///
    /// A missing key leaves its default. A blob that does not parse fails the
    /// load with `StoreError::Corrupt`; see `load_or_recover` for the path
    /// that repairs it instead.
    pub fn load(storage: S, clock: impl Clock + 'static) -> Result<Self, StoreError> {
        let state = read_state(&storage)?;

        info!(
            "Loaded {} habits, {} logs",
            state.habits.len(),
            state.logs.len()
        );

        Ok(Self::from_state(storage, Box::new(clock), state))
    }

    /// Load the store, running the sync recovery chain if a blob is corrupt
    ///
    /// Returns the outcome of the recovery when one was needed.
    pub fn load_or_recover(
        storage: S,
        clock: impl Clock + 'static,
    ) -> Result<(Self, Option<SyncOutcome>), StoreError> {
        match read_state(&storage) {
            Ok(state) => Ok((Self::from_state(storage, Box::new(clock), state), None)),
            Err(StoreError::Corrupt { key, source }) => {
                tracing::warn!("Persisted '{}' is corrupt at startup ({}), recovering", key, source);
                let mut store = Self::from_state(storage, Box::new(clock), PersistedState::default());
                let outcome = store.recover()?;
                Ok((store, Some(outcome)))
            }
            Err(e) => Err(e),
        }
    }

    fn from_state(storage: S, clock: Box<dyn Clock>, state: PersistedState) -> Self {
        Self {
            storage,
            clock,
            habits: state.habits,
            logs: state.logs,
            settings: state.settings,
            listeners: Vec::new(),
        }
    }

    // Read interface

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn logs(&self) -> &[CompletionLog] {
        &self.logs
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn habit(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| &h.id == id)
    }

    pub fn active_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| h.is_active)
    }

    pub fn logs_for_habit<'a>(&'a self, id: &'a HabitId) -> impl Iterator<Item = &'a CompletionLog> {
        self.logs.iter().filter(move |log| &log.habit_id == id)
    }

    /// Whether a completed log exists for the habit on `date`
    pub fn is_completed_on(&self, habit_id: &HabitId, date: NaiveDate) -> bool {
        self.logs
            .iter()
            .any(|log| log.completed && log.is_for(habit_id, date))
    }

    /// Today's date according to the store's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Derived metrics

    /// Completion percentage over the `window_days` days ending today
    pub fn habit_progress(&self, habit_id: &HabitId, window_days: u32) -> u8 {
        domain::window_progress(&self.logs, habit_id, self.today(), window_days)
    }

    /// Completed logs dated today, across all habits
    pub fn today_completed_count(&self) -> usize {
        domain::completed_on(&self.logs, self.today())
    }

    /// Consecutive completed days ending today
    pub fn streak_for_habit(&self, habit_id: &HabitId) -> u32 {
        domain::current_streak(&self.logs, habit_id, self.today())
    }

    /// Current and best streak with totals
    pub fn streak_summary(&self, habit_id: &HabitId) -> Streak {
        Streak::calculate(habit_id.clone(), &self.logs, self.today())
    }

    /// Logs whose habit no longer exists
    pub fn orphaned_logs(&self) -> Vec<&CompletionLog> {
        self.logs
            .iter()
            .filter(|log| self.habit(&log.habit_id).is_none())
            .collect()
    }

    // Mutators

    /// Create a habit with a new id and the current timestamp
    ///
    /// The data is stored as given; validation belongs to the caller.
    pub fn add_habit(&mut self, data: NewHabit) -> Result<Habit, StoreError> {
        let habit = Habit::create(data, self.clock.now());
        self.habits.push(habit.clone());
        self.persist_habits()?;

        debug!("Created habit: {} ({})", habit.name, habit.id);
        self.emit(StoreEvent::HabitAdded {
            habit_id: habit.id.clone(),
        });
        Ok(habit)
    }

    /// Merge `patch` into the habit with `id`
    ///
    /// Returns `false` without touching storage when no such habit exists.
    pub fn update_habit(&mut self, id: &HabitId, patch: HabitPatch) -> Result<bool, StoreError> {
        let Some(habit) = self.habits.iter_mut().find(|h| &h.id == id) else {
            debug!("Update skipped, habit {} not found", id);
            return Ok(false);
        };

        patch.apply_to(habit);
        self.persist_habits()?;

        debug!("Updated habit: {}", id);
        self.emit(StoreEvent::HabitUpdated {
            habit_id: id.clone(),
        });
        Ok(true)
    }

    /// Remove a habit and every log that references it
    ///
    /// Deleting an unknown id is a no-op, apart from clearing any orphaned
    /// logs that still carry that id.
    pub fn delete_habit(&mut self, id: &HabitId) -> Result<(), StoreError> {
        let habits_before = self.habits.len();
        let logs_before = self.logs.len();

        self.habits.retain(|h| &h.id != id);
        self.logs.retain(|log| &log.habit_id != id);

        let removed_habit = self.habits.len() != habits_before;
        let removed_logs = logs_before - self.logs.len();

        if removed_habit {
            self.persist_habits()?;
        }
        if removed_logs > 0 {
            self.persist_logs()?;
        }

        if removed_habit || removed_logs > 0 {
            debug!("Deleted habit {} and {} log(s)", id, removed_logs);
            self.emit(StoreEvent::HabitDeleted {
                habit_id: id.clone(),
                removed_logs,
            });
        }
        Ok(())
    }

    /// Flip the completion of a habit on `date`
    ///
    /// An existing log has its flag inverted and its notes replaced; otherwise
    /// a new completed log is added. Returns the resulting flag. The habit id
    /// is not checked against the habit list.
    pub fn toggle_completion(
        &mut self,
        habit_id: &HabitId,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<bool, StoreError> {
        let completed = match self.logs.iter_mut().find(|log| log.is_for(habit_id, date)) {
            Some(log) => {
                log.completed = !log.completed;
                log.notes = notes;
                log.completed
            }
            None => {
                self.logs
                    .push(CompletionLog::completed(habit_id.clone(), date, notes));
                true
            }
        };
        self.persist_logs()?;

        debug!("Toggled habit {} on {} -> {}", habit_id, date, completed);
        self.emit(StoreEvent::CompletionToggled {
            habit_id: habit_id.clone(),
            date,
            completed,
        });
        Ok(completed)
    }

    /// Shallow-merge into the current settings
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<(), StoreError> {
        patch.apply_to(&mut self.settings);
        self.persist_settings()?;

        debug!("Updated settings: {:?}", self.settings);
        self.emit(StoreEvent::SettingsUpdated);
        Ok(())
    }

    /// Remove logs whose habit no longer exists, returning how many went
    pub fn prune_orphaned_logs(&mut self) -> Result<usize, StoreError> {
        let habits = &self.habits;
        let before = self.logs.len();
        self.logs
            .retain(|log| habits.iter().any(|h| h.id == log.habit_id));
        let removed = before - self.logs.len();

        if removed > 0 {
            self.persist_logs()?;
            info!("Pruned {} orphaned log(s)", removed);
            self.emit(StoreEvent::OrphansPruned {
                removed_logs: removed,
            });
        }
        Ok(removed)
    }

    /// Register a callback for every future change
    pub fn subscribe(&mut self, listener: impl Fn(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // Persistence helpers

    fn emit(&self, event: StoreEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    fn replace_state(&mut self, state: PersistedState) -> Result<(), StoreError> {
        self.habits = state.habits;
        self.logs = state.logs;
        self.settings = state.settings;
        self.persist_habits()?;
        self.persist_logs()?;
        self.persist_settings()
    }

    fn write_blob<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.storage.set(key, &raw)?;
        Ok(())
    }

    fn persist_habits(&self) -> Result<(), StoreError> {
        self.write_blob(HABITS_KEY, &self.habits)
    }

    fn persist_logs(&self) -> Result<(), StoreError> {
        self.write_blob(LOGS_KEY, &self.logs)
    }

    fn persist_settings(&self) -> Result<(), StoreError> {
        self.write_blob(SETTINGS_KEY, &self.settings)
    }
}

/// Read and parse one blob; empty values count as absent
fn read_blob<S: BlobStore, T: DeserializeOwned>(
    storage: &S,
    key: &'static str,
) -> Result<Option<T>, StoreError> {
    match storage.get(key)? {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source }),
        _ => Ok(None),
    }
}

/// Read the three primary blobs independently
pub(crate) fn read_state<S: BlobStore>(storage: &S) -> Result<PersistedState, StoreError> {
    Ok(PersistedState {
        habits: read_blob(storage, HABITS_KEY)?.unwrap_or_default(),
        logs: read_blob(storage, LOGS_KEY)?.unwrap_or_default(),
        settings: read_blob(storage, SETTINGS_KEY)?.unwrap_or_default(),
    })
}
