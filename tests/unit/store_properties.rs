/// Behavioral properties of the habit store
use chrono::{Duration, NaiveDate};
use habit_store::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn store() -> HabitStore<SqliteBlobStore> {
    let storage = SqliteBlobStore::open_in_memory().unwrap();
    HabitStore::load(storage, FixedClock::on(today())).unwrap()
}

fn daily(name: &str) -> NewHabit {
    HabitDraft {
        name: name.to_string(),
        description: String::new(),
        category: "Learning".to_string(),
        custom_category: String::new(),
        frequency: Frequency::Daily,
        target_days: vec![],
        color: None,
        is_active: true,
    }
    .validate()
    .unwrap()
}

fn complete_days(store: &mut HabitStore<SqliteBlobStore>, habit_id: &HabitId, offsets: &[i64]) {
    for offset in offsets {
        store
            .toggle_completion(habit_id, today() - Duration::days(*offset), None)
            .unwrap();
    }
}

#[test]
fn toggle_twice_restores_and_reuses_row() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();
    let day = today() - Duration::days(3);

    store.toggle_completion(&habit.id, day, None).unwrap();
    store.toggle_completion(&habit.id, day, None).unwrap();

    let logs: Vec<_> = store.logs_for_habit(&habit.id).collect();
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].completed);
    assert!(!store.is_completed_on(&habit.id, day));
}

#[test]
fn delete_leaves_no_logs_behind() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();
    complete_days(&mut store, &habit.id, &[0, 1, 2, 5, 9]);

    store.delete_habit(&habit.id).unwrap();

    assert!(store.logs().iter().all(|log| log.habit_id != habit.id));
}

#[test]
fn streak_counts_consecutive_days_ending_today() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();
    complete_days(&mut store, &habit.id, &[0, 1, 2, 3, 5, 6]);

    assert_eq!(store.streak_for_habit(&habit.id), 4);
    let summary = store.streak_summary(&habit.id);
    assert_eq!(summary.longest_streak, 4);
    assert_eq!(summary.total_completions, 6);
}

#[test]
fn streak_is_zero_without_completion_today() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();
    complete_days(&mut store, &habit.id, &[1, 2, 3]);

    assert_eq!(store.streak_for_habit(&habit.id), 0);
    assert_eq!(store.streak_summary(&habit.id).longest_streak, 3);
}

#[test]
fn progress_window_boundaries() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();
    assert_eq!(store.habit_progress(&habit.id, 7), 0);

    complete_days(&mut store, &habit.id, &[0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(store.habit_progress(&habit.id, 7), 100);
    assert_eq!(store.habit_progress(&habit.id, 14), 50);
    assert_eq!(store.habit_progress(&habit.id, 0), 0);

    // A log just outside the window and one in the future do not count
    complete_days(&mut store, &habit.id, &[7, -1]);
    assert_eq!(store.habit_progress(&habit.id, 7), 100);
    assert_eq!(store.habit_progress(&habit.id, 8), 100);
    assert_eq!(store.habit_progress(&habit.id, 10), 80);
}

#[test]
fn read_scenario() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();

    assert!(!habit.id.as_str().is_empty());
    assert_eq!(habit.created_at, FixedClock::on(today()).now());
    assert!(habit.is_active);

    store.toggle_completion(&habit.id, store.today(), None).unwrap();
    assert_eq!(store.today_completed_count(), 1);

    store.toggle_completion(&habit.id, store.today(), None).unwrap();
    assert_eq!(store.today_completed_count(), 0);
}

#[test]
fn weekly_target_days_persist() {
    let mut store = store();

    let weekly = HabitDraft {
        name: "Gym".to_string(),
        description: String::new(),
        category: "Exercise".to_string(),
        custom_category: String::new(),
        frequency: Frequency::Weekly,
        target_days: vec![5, 1, 3],
        color: None,
        is_active: true,
    };

    let mut empty = weekly.clone();
    empty.target_days.clear();
    assert!(matches!(empty.validate(), Err(DomainError::InvalidTargetDays(_))));

    let habit = store.add_habit(weekly.validate().unwrap()).unwrap();
    assert_eq!(habit.target_days, vec![1, 3, 5]);

    let raw = store.storage().get("habits").unwrap().unwrap();
    let stored: Vec<Habit> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0].target_days, vec![1, 3, 5]);
    assert_eq!(stored[0].frequency, Frequency::Weekly);
}

#[test]
fn corrupt_blob_restored_from_backup() {
    let mut store = store();
    let habit = store.add_habit(daily("Read")).unwrap();
    complete_days(&mut store, &habit.id, &[0, 1]);
    store.sync_offline_data(Connectivity::Online).unwrap();
    let expected_habits = store.habits().to_vec();
    let expected_logs = store.logs().to_vec();

    store.storage().set("habitLogs", "[{broken").unwrap();
    let outcome = store.sync_offline_data(Connectivity::Online).unwrap();

    assert!(matches!(outcome, SyncOutcome::RestoredFromBackup { .. }));
    assert_eq!(store.habits(), expected_habits.as_slice());
    assert_eq!(store.logs(), expected_logs.as_slice());
}

#[test]
fn corrupt_blob_without_backup_resets() {
    let mut store = store();
    store.add_habit(daily("Read")).unwrap();

    store.storage().set("appSettings", "nope").unwrap();
    let outcome = store.sync_offline_data(Connectivity::Offline).unwrap();

    assert_eq!(outcome, SyncOutcome::ResetToDefaults);
    assert!(store.habits().is_empty());
    assert!(store.logs().is_empty());
    assert_eq!(store.settings(), &Settings::default());
}

#[test]
fn offline_sync_skips_backup() {
    let mut store = store();
    store.add_habit(daily("Read")).unwrap();

    let outcome = store.sync_offline_data(Connectivity::Offline).unwrap();

    assert_eq!(outcome, SyncOutcome::Verified { backed_up: false });
    assert!(store.read_backup().unwrap().is_none());
}
