/// Basic integration tests
use habit_store::*;
use tempfile::{tempdir, NamedTempFile};

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn new_habit(name: &str) -> NewHabit {
        NewHabit {
            name: name.to_string(),
            description: String::new(),
            category: "Health".to_string(),
            frequency: Frequency::Weekly,
            target_days: vec![1, 3, 5],
            color: "#22c55e".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit = {
            let mut server = HabitTrackerServer::new(db_path.clone(), false)
                .expect("Failed to create first server");
            let store = server.store_mut();
            let habit = store.add_habit(new_habit("Stretch")).unwrap();
            let today = store.today();
            store.toggle_completion(&habit.id, today, Some("morning".into())).unwrap();
            store
                .update_settings(SettingsPatch {
                    theme: Some(Theme::Dark),
                    ..Default::default()
                })
                .unwrap();
            habit
        };

        let server = HabitTrackerServer::new(db_path, false).expect("Failed to create second server");
        let store = server.store();

        assert_eq!(store.habits(), &[habit.clone()]);
        assert_eq!(store.logs_for_habit(&habit.id).count(), 1);
        assert_eq!(store.logs()[0].notes.as_deref(), Some("morning"));
        assert_eq!(store.settings().theme, Theme::Dark);
    }

    #[test]
    fn test_corrupt_database_needs_recover_flag() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("habits.db");

        {
            let mut server = HabitTrackerServer::new(db_path.clone(), false).unwrap();
            let store = server.store_mut();
            store.add_habit(new_habit("Stretch")).unwrap();
            store.sync_offline_data(Connectivity::Online).unwrap();
            store.storage().set("habits", "{{{").unwrap();
        }

        let refused = HabitTrackerServer::new(db_path.clone(), false);
        assert!(matches!(
            refused,
            Err(ServerError::Store(StoreError::Corrupt { key: "habits", .. }))
        ));

        let server = HabitTrackerServer::new(db_path.clone(), true).unwrap();
        assert_eq!(server.store().habits().len(), 1);
        assert_eq!(server.store().habits()[0].name, "Stretch");

        // The recovered state was written back, so a plain open works again
        let reopened = HabitTrackerServer::new(db_path, false).unwrap();
        assert_eq!(reopened.store().habits().len(), 1);
    }

    #[test]
    fn test_export_survives_clear() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("habits.db");

        let mut server = HabitTrackerServer::new(db_path.clone(), false).unwrap();
        let store = server.store_mut();
        store.add_habit(new_habit("Stretch")).unwrap();
        let exported = store.export().to_json_pretty().unwrap();

        store.clear_all().unwrap();
        assert!(store.habits().is_empty());
        drop(server);

        let mut server = HabitTrackerServer::new(db_path, false).unwrap();
        assert!(server.store().habits().is_empty());

        let document = ImportDocument::parse(&exported).unwrap();
        server.store_mut().import(document).unwrap();
        assert_eq!(server.store().habits()[0].target_days, vec![1, 3, 5]);
    }
}
