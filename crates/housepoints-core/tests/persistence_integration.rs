//! Integration tests for saving and loading tracker state.

use chrono::{NaiveDate, Utc};
use housepoints_core::{DataStore, HabitTracker, ScoringRules, StoreError};
use proptest::prelude::*;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

#[test]
fn test_state_survives_separate_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::open(dir.path().join("data.json"));

    // Each block mirrors one CLI invocation: load, apply, save.
    {
        let mut tracker = store.load_tracker(ScoringRules::default()).unwrap();
        tracker.create_household("Ons4").unwrap();
        tracker.add_user("Kris", "Ons4").unwrap();
        tracker.add_habit("Make bed", "daily", 5, Utc::now()).unwrap();
        store.save_tracker(&tracker).unwrap();
    }
    for d in 1..=7 {
        let mut tracker = store.load_tracker(ScoringRules::default()).unwrap();
        tracker.complete_habit("Kris", "Make bed", date(3, d)).unwrap();
        store.save_tracker(&tracker).unwrap();
    }

    let tracker = store.load_tracker(ScoringRules::default()).unwrap();
    assert_eq!(tracker.streaks().count("Kris", "Make bed"), 7);
    assert_eq!(tracker.directory().get_points("Ons4", "Kris"), Ok(7 * 5 + 5));
}

#[test]
fn test_legacy_data_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(
        &path,
        r#"{
            "households": {"Ons4": {"members": ["Kris", "Len"], "points": {"Kris": 20, "Len": 5}}},
            "habits": [{"name": "Make bed", "periodicity": "daily", "created_at": "2025-03-01T10:00:00.000001", "points": 5, "is_bonus": false}],
            "bonus_habits": [],
            "leaderboard": {
                "rankings": {},
                "past_rankings": [{"month": "02-2025", "rankings": {"Ons4": {"Kris": 40, "Len": 55}}}]
            },
            "streaks": {"Kris": {"Make bed": 4}},
            "completed_habits": {"2025-03-04": {"Make bed": "Kris"}}
        }"#,
    )
    .unwrap();

    let mut tracker = DataStore::open(&path)
        .load_tracker(ScoringRules::default())
        .unwrap();
    let past = tracker.past_rankings("Ons4").unwrap();
    assert_eq!(past[0].period, "2025-02");
    assert_eq!(past[0].rankings[0].user, "Len");

    // The bare count continues from the last recorded completion.
    let outcome = tracker.complete_habit("Kris", "Make bed", date(3, 5)).unwrap();
    assert_eq!(outcome.streak, 5);
    assert!(tracker.ledger().has_completed(
        "Kris",
        "Make bed",
        housepoints_core::Bucket::Day(date(3, 4))
    ));
}

#[test]
fn test_legacy_twenty_day_streak_reaches_milestone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(
        &path,
        r#"{
            "households": {"Ons4": {"members": ["Kris"], "points": {"Kris": 110}}},
            "habits": [{"name": "Make bed", "periodicity": "daily", "created_at": "2025-03-01T10:00:00", "points": 5, "is_bonus": false}],
            "streaks": {"Kris": {"Make bed": 20}},
            "completed_habits": {"2025-03-20": {"Make bed": "Kris"}}
        }"#,
    )
    .unwrap();

    let store = DataStore::open(&path);
    let mut tracker = store.load_tracker(ScoringRules::default()).unwrap();
    let outcome = tracker.complete_habit("Kris", "Make bed", date(3, 21)).unwrap();
    assert_eq!(outcome.streak, 21);
    assert_eq!(outcome.award.total, 10);
    assert_eq!(outcome.total_points, 120);

    // Saved in the current layout, the streak keeps its bucket.
    store.save_tracker(&tracker).unwrap();
    let reloaded = store.load_tracker(ScoringRules::default()).unwrap();
    let entry = reloaded.streaks().get("Kris", "Make bed").unwrap();
    assert_eq!((entry.count, entry.longest), (21, 21));
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(
        &path,
        r#"{"households": {"Ons4": {"members": ["Kris"], "points": {"Ghost": 3}}}}"#,
    )
    .unwrap();
    let result = DataStore::open(&path).load_tracker(ScoringRules::default());
    assert!(matches!(result, Err(StoreError::Malformed { .. })));
    // The file is left untouched.
    assert!(std::fs::read_to_string(&path).unwrap().contains("Ghost"));
}

proptest! {
    #[test]
    fn ranking_is_sorted_after_reload(points in proptest::collection::vec(1i64..50, 1..6)) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::open(dir.path().join("data.json"));
        let mut tracker = HabitTracker::new();
        tracker.create_household("Ons4").unwrap();
        for (i, pts) in points.iter().enumerate() {
            let user = format!("user{i}");
            let habit = format!("habit{i}");
            tracker.add_user(&user, "Ons4").unwrap();
            tracker.add_habit(&habit, "daily", *pts, Utc::now()).unwrap();
            tracker.complete_habit(&user, &habit, date(3, 1)).unwrap();
        }
        store.save_tracker(&tracker).unwrap();

        let loaded = store.load_tracker(ScoringRules::default()).unwrap();
        let ranking = loaded.view_leaderboard("Ons4").unwrap();
        prop_assert_eq!(ranking.len(), points.len());
        for pair in ranking.windows(2) {
            prop_assert!(
                pair[0].points > pair[1].points
                    || (pair[0].points == pair[1].points && pair[0].user < pair[1].user)
            );
        }
        prop_assert_eq!(ranking, tracker.view_leaderboard("Ons4").unwrap());
    }
}
