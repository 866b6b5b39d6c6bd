/// Integrity check, backup and recovery
///
/// `sync_offline_data` runs when the device comes back online. It re-reads
/// the three persisted blobs; if they all parse and the device is online it
/// snapshots them into the backup blob. If any of them is corrupt it replaces
/// the whole state with the backup, or with defaults when there is no usable
/// backup. Recovery is all or nothing: no field-level repair is attempted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::{dedupe_logs, CompletionLog, Habit, Settings};
use crate::storage::{BlobStore, BACKUP_KEY};
use crate::store::{read_state, HabitStore, PersistedState, StoreError, StoreEvent};

/// Whether the device currently has a network connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_online(online: bool) -> Self {
        if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }
}

/// Full-state snapshot stored under `habit-tracker-backup`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub habit_logs: Vec<CompletionLog>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

/// What a sync run ended up doing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Every blob parsed; `backed_up` tells whether a backup was written
    Verified { backed_up: bool },
    /// A blob was corrupt and the backup replaced the whole state
    RestoredFromBackup { last_sync: Option<DateTime<Utc>> },
    /// A blob was corrupt and no usable backup existed
    ResetToDefaults,
}

impl<S: BlobStore> HabitStore<S> {
    /// Verify persisted data and back it up, or recover from corruption
    ///
    /// A backup is only written when `connectivity` is online. Storage
    /// failures (as opposed to unparsable data) are returned as errors.
    pub fn sync_offline_data(&mut self, connectivity: Connectivity) -> Result<SyncOutcome, StoreError> {
        info!("Syncing offline data...");

        match read_state(&self.storage) {
            Ok(state) => {
                info!("Local data integrity check passed");

                if !connectivity.is_online() {
                    return Ok(SyncOutcome::Verified { backed_up: false });
                }

                let backup = Backup {
                    habits: state.habits,
                    habit_logs: state.logs,
                    settings: state.settings,
                    last_sync: Some(self.clock.now()),
                };
                let raw = serde_json::to_string(&backup)?;
                self.storage.set(BACKUP_KEY, &raw)?;

                info!("Automatic backup created");
                Ok(SyncOutcome::Verified { backed_up: true })
            }
            Err(StoreError::Corrupt { key, source }) => {
                warn!("Data corruption detected in '{}': {}, attempting recovery", key, source);
                self.recover()
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the whole state from the backup, or reset it to defaults
    ///
    /// A backup listing several logs for one habit and day keeps the last
    /// of them. The resulting state is written through to the primary blobs.
    pub(crate) fn recover(&mut self) -> Result<SyncOutcome, StoreError> {
        let (state, outcome) = match self.read_backup()? {
            Some(backup) => {
                info!("Data recovered from backup taken at {:?}", backup.last_sync);
                let outcome = SyncOutcome::RestoredFromBackup {
                    last_sync: backup.last_sync,
                };
                let listed = backup.habit_logs.len();
                let logs = dedupe_logs(backup.habit_logs);
                if logs.len() < listed {
                    warn!("Dropped {} repeated logs from the backup", listed - logs.len());
                }
                let state = PersistedState {
                    habits: backup.habits,
                    logs,
                    settings: backup.settings,
                };
                (state, outcome)
            }
            None => {
                error!("Backup recovery failed, resetting to defaults");
                (PersistedState::default(), SyncOutcome::ResetToDefaults)
            }
        };

        self.replace_state(state)?;
        self.emit(StoreEvent::Restored {
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// The parsed backup, or `None` when it is absent or unparsable
    pub fn read_backup(&self) -> Result<Option<Backup>, StoreError> {
        let Some(raw) = self.storage.get(BACKUP_KEY)? else {
            warn!("No backup available");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(backup) => Ok(Some(backup)),
            Err(e) => {
                warn!("Backup is unreadable: {}", e);
                Ok(None)
            }
        }
    }
}

/// Tracks connectivity and reports offline-to-online transitions
///
/// Sync is triggered by the transition, not by every "online" report, so a
/// client repeating its status does not cause repeated backups.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    last: Connectivity,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        Self { last: initial }
    }

    pub fn current(&self) -> Connectivity {
        self.last
    }

    /// Record a new state; true when it is a transition to online
    pub fn observe(&mut self, now: Connectivity) -> bool {
        let came_online = !self.last.is_online() && now.is_online();
        self.last = now;
        came_online
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(Connectivity::Online)
    }
}
