/// Basic unit tests to verify core functionality
use habit_store::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn draft(name: &str, frequency: Frequency, target_days: Vec<u8>) -> HabitDraft {
        HabitDraft {
            name: name.to_string(),
            description: String::new(),
            category: "Health".to_string(),
            custom_category: String::new(),
            frequency,
            target_days,
            color: None,
            is_active: true,
        }
    }

    #[test]
    fn test_habit_creation() {
        let new_habit = draft("  Test Habit ", Frequency::Daily, vec![]).validate().unwrap();
        assert_eq!(new_habit.name, "Test Habit");
        assert_eq!(new_habit.target_days, ALL_WEEKDAYS.to_vec());

        let created_at = FixedClock::on(chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()).now();
        let habit = Habit::create(new_habit, created_at);
        assert!(habit.is_active);
        assert_eq!(habit.created_at, created_at);
        assert!(!habit.id.as_str().is_empty());
    }

    #[test]
    fn test_completion_log_creation() {
        let habit_id = HabitId::new();
        let today = chrono::Utc::now().date_naive();

        let log = CompletionLog::completed(habit_id.clone(), today, Some("Great work!".to_string()));

        assert!(log.completed);
        assert!(log.is_for(&habit_id, today));
        assert!(log.has_notes());
    }

    #[test]
    fn test_frequency_names() {
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            assert_eq!(Frequency::parse(frequency.as_str()), Some(frequency));
        }
        assert_eq!(Frequency::parse("weekdays"), None);
    }

    #[test]
    fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = HabitTrackerServer::new(temp_file.path().to_path_buf(), false);
        assert!(server.is_ok());
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteBlobStore::new(temp_file.path().to_path_buf()).unwrap();

        let _: &dyn BlobStore = &storage;
        assert!(storage.keys().unwrap().is_empty());

        let store = HabitStore::open(storage).unwrap();
        assert!(store.habits().is_empty());
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.notifications);
        assert_eq!(settings.week_starts_on, WeekStart::Monday);
    }
}
