/// Tools for data management
///
/// This module implements data_export, data_import, data_clear, logs_prune
/// and habit_sync.

use serde::{Deserialize, Serialize};
use crate::store::{Connectivity, ExportDocument, HabitStore, ImportDocument, SyncOutcome};
use crate::storage::BlobStore;
use crate::tools::ToolError;

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub file_name: String,
    pub document: ExportDocument,
    pub message: String,
}

pub fn export_data<S: BlobStore>(store: &HabitStore<S>) -> Result<ExportResponse, ToolError> {
    let document = store.export();
    Ok(ExportResponse {
        file_name: document.file_name(),
        message: format!(
            "📦 Exported {} habits and {} completion records",
            document.habits.len(),
            document.habit_logs.len()
        ),
        document,
    })
}

/// Parameters for importing a previous export
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    /// The export document, as JSON text
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub habits: usize,
    pub logs: usize,
    pub message: String,
}

/// Replace all data with an exported document
///
/// A document that fails validation leaves the current data untouched.
pub fn import_data<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: ImportParams,
) -> Result<ImportResponse, ToolError> {
    let document = ImportDocument::parse(&params.data)?;
    let summary = store.import(document)?;

    Ok(ImportResponse {
        success: true,
        habits: summary.habits,
        logs: summary.logs,
        message: format!(
            "✅ Imported {} habits and {} completion records",
            summary.habits, summary.logs
        ),
    })
}

/// Parameters for clearing all data
#[derive(Debug, Deserialize)]
pub struct ClearParams {
    /// Must be true; guards against accidental calls
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

pub fn clear_data<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: ClearParams,
) -> Result<ClearResponse, ToolError> {
    if !params.confirm {
        return Ok(ClearResponse {
            success: false,
            message: "Nothing was deleted. Pass confirm: true to delete all habits, records and settings".to_string(),
        });
    }

    store.clear_all()?;
    Ok(ClearResponse {
        success: true,
        message: "🧹 All habits, completion records and settings were deleted".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    pub removed_logs: usize,
    pub message: String,
}

/// Remove completion records whose habit no longer exists
pub fn prune_logs<S: BlobStore>(store: &mut HabitStore<S>) -> Result<PruneResponse, ToolError> {
    let removed_logs = store.prune_orphaned_logs()?;
    let message = match removed_logs {
        0 => "No orphaned records found".to_string(),
        n => format!("🧹 Removed {} orphaned record(s)", n),
    };
    Ok(PruneResponse { removed_logs, message })
}

fn default_online() -> bool {
    true
}

/// Parameters for a manual sync
#[derive(Debug, Deserialize)]
pub struct SyncParams {
    #[serde(default = "default_online")]
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub outcome: SyncOutcome,
    pub message: String,
}

pub fn sync_data<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: SyncParams,
) -> Result<SyncResponse, ToolError> {
    let outcome = store.sync_offline_data(Connectivity::from_online(params.online))?;
    Ok(SyncResponse {
        message: sync_message(&outcome),
        outcome,
    })
}

pub(crate) fn sync_message(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Verified { backed_up: true } => "✅ Data verified and backed up".to_string(),
        SyncOutcome::Verified { backed_up: false } => {
            "✅ Data verified. Backup skipped while offline".to_string()
        }
        SyncOutcome::RestoredFromBackup { last_sync } => match last_sync {
            Some(at) => format!("⚠️ Corrupt data was restored from the backup taken at {}", at),
            None => "⚠️ Corrupt data was restored from the backup".to_string(),
        },
        SyncOutcome::ResetToDefaults => {
            "⚠️ Corrupt data could not be recovered and was reset".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, HabitId, NewHabit};
    use crate::storage::{BACKUP_KEY, HABITS_KEY};
    use crate::tools::test_support::{store, today};

    fn seed<S: BlobStore>(store: &mut HabitStore<S>) -> HabitId {
        let habit = store
            .add_habit(NewHabit {
                name: "Read".to_string(),
                description: String::new(),
                category: "Learning".to_string(),
                frequency: Frequency::Daily,
                target_days: vec![0, 1, 2, 3, 4, 5, 6],
                color: String::new(),
                is_active: true,
            })
            .unwrap();
        store.toggle_completion(&habit.id, today(), None).unwrap();
        habit.id
    }

    #[test]
    fn test_export_then_import() {
        let mut source = store();
        seed(&mut source);
        let exported = export_data(&source).unwrap();
        assert!(exported.file_name.ends_with("2024-06-10.json"));

        let mut target = store();
        let data = serde_json::to_string(&exported.document).unwrap();
        let response = import_data(&mut target, ImportParams { data }).unwrap();

        assert_eq!((response.habits, response.logs), (1, 1));
        assert_eq!(target.habits(), source.habits());
    }

    #[test]
    fn test_bad_import_keeps_data() {
        let mut store = store();
        seed(&mut store);

        let params = ImportParams { data: r#"{"habits": []}"#.to_string() };
        assert!(matches!(import_data(&mut store, params), Err(ToolError::Transfer(_))));
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut store = store();
        seed(&mut store);

        let response = clear_data(&mut store, ClearParams { confirm: false }).unwrap();
        assert!(!response.success);
        assert_eq!(store.habits().len(), 1);

        clear_data(&mut store, ClearParams { confirm: true }).unwrap();
        assert!(store.habits().is_empty());
        assert!(store.logs().is_empty());
    }

    #[test]
    fn test_sync_writes_backup_then_recovers() {
        let mut store = store();
        seed(&mut store);

        let response = sync_data(&mut store, SyncParams { online: true }).unwrap();
        assert_eq!(response.outcome, SyncOutcome::Verified { backed_up: true });
        assert!(store.storage().get(BACKUP_KEY).unwrap().is_some());

        store.storage().set(HABITS_KEY, "garbage").unwrap();
        let response = sync_data(&mut store, SyncParams { online: false }).unwrap();
        assert!(matches!(response.outcome, SyncOutcome::RestoredFromBackup { .. }));
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn test_prune_reports_count() {
        let mut store = store();
        store
            .toggle_completion(&HabitId::from_string("ghost"), today(), None)
            .unwrap();

        assert_eq!(prune_logs(&mut store).unwrap().removed_logs, 1);
        assert_eq!(prune_logs(&mut store).unwrap().removed_logs, 0);
    }
}
