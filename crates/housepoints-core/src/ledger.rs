//! Completion ledger: who completed which habit in which bucket.
//!
//! Bonus habits are first-come-first-served: a (bucket, habit) slot holds one
//! claimant and every later claim for that slot fails. Ordinary habits keep a
//! list per slot so each member completes independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::TrackerError;
use crate::habit::Habit;
use crate::streak::StreakTracker;

/// One (bucket, habit) slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionEntry {
    /// Bonus slot and its single claimant.
    Claimed(String),
    /// Ordinary slot and every user who completed it.
    Completed(Vec<String>),
}

impl CompletionEntry {
    pub fn users(&self) -> Vec<&str> {
        match self {
            CompletionEntry::Claimed(user) => vec![user.as_str()],
            CompletionEntry::Completed(users) => users.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, user: &str) -> bool {
        match self {
            CompletionEntry::Claimed(claimant) => claimant == user,
            CompletionEntry::Completed(users) => users.iter().any(|u| u == user),
        }
    }
}

/// Result of a successful [`CompletionLedger::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub streak: u32,
    /// Always true for a bonus claim that went through.
    pub first_claim: bool,
}

/// Per-bucket completion counts for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: Bucket,
    pub completed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLedger {
    slots: BTreeMap<Bucket, BTreeMap<String, CompletionEntry>>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(slots: BTreeMap<Bucket, BTreeMap<String, CompletionEntry>>) -> Self {
        Self { slots }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<Bucket, BTreeMap<String, CompletionEntry>> {
        &self.slots
    }

    fn slot(&self, bucket: Bucket, habit: &str) -> Option<&CompletionEntry> {
        self.slots.get(&bucket)?.get(habit)
    }

    /// Holder of a bonus slot.
    pub fn claimant(&self, bucket: Bucket, habit: &str) -> Option<&str> {
        match self.slot(bucket, habit)? {
            CompletionEntry::Claimed(user) => Some(user.as_str()),
            CompletionEntry::Completed(_) => None,
        }
    }

    pub fn has_completed(&self, user: &str, habit: &str, bucket: Bucket) -> bool {
        self.slot(bucket, habit).is_some_and(|e| e.contains(user))
    }

    /// Check whether `user` may record `habit` in `bucket`, without changing
    /// anything.
    ///
    /// # Errors
    /// `BonusAlreadyClaimed` when another user holds the bonus slot,
    /// `AlreadyCompleted` when `user` already recorded this slot.
    pub fn check(&self, user: &str, habit: &Habit, bucket: Bucket) -> Result<(), TrackerError> {
        let Some(entry) = self.slot(bucket, &habit.name) else {
            return Ok(());
        };
        if entry.contains(user) {
            return Err(TrackerError::AlreadyCompleted {
                user: user.to_string(),
                habit: habit.name.clone(),
                bucket: bucket.to_string(),
            });
        }
        match entry {
            CompletionEntry::Claimed(claimed_by) if habit.is_bonus => {
                Err(TrackerError::BonusAlreadyClaimed {
                    habit: habit.name.clone(),
                    bucket: bucket.to_string(),
                    claimed_by: claimed_by.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Write the slot. Callers run [`CompletionLedger::check`] first.
    pub(crate) fn claim(&mut self, user: &str, habit: &Habit, bucket: Bucket) {
        let slots = self.slots.entry(bucket).or_default();
        if habit.is_bonus {
            slots.insert(habit.name.clone(), CompletionEntry::Claimed(user.to_string()));
            return;
        }
        let entry = slots
            .entry(habit.name.clone())
            .or_insert_with(|| CompletionEntry::Completed(Vec::new()));
        let mut users: Vec<String> = entry.users().into_iter().map(str::to_string).collect();
        users.push(user.to_string());
        *entry = CompletionEntry::Completed(users);
    }

    /// Record a completion and advance the user's streak.
    ///
    /// Both the slot and the streak are validated before either is written.
    pub fn record(
        &mut self,
        streaks: &mut StreakTracker,
        user: &str,
        habit: &Habit,
        bucket: Bucket,
    ) -> Result<LedgerReceipt, TrackerError> {
        self.check(user, habit, bucket)?;
        let entry = streaks.plan(user, &habit.name, bucket)?;
        self.claim(user, habit, bucket);
        streaks.commit(user, &habit.name, entry);
        Ok(LedgerReceipt {
            streak: entry.count,
            first_claim: habit.is_bonus,
        })
    }

    /// Latest bucket holding any completion of `habit`.
    pub fn last_completed(&self, habit: &str) -> Option<Bucket> {
        self.slots
            .iter()
            .rev()
            .find(|(_, habits)| habits.contains_key(habit))
            .map(|(bucket, _)| *bucket)
    }

    /// Latest bucket in which `user` recorded `habit`.
    pub fn last_completed_by(&self, user: &str, habit: &str) -> Option<Bucket> {
        self.slots
            .iter()
            .rev()
            .find(|(_, habits)| habits.get(habit).is_some_and(|e| e.contains(user)))
            .map(|(bucket, _)| *bucket)
    }

    /// Habits recorded by `user`, grouped by bucket. Day buckets come before
    /// week buckets, each in chronological order.
    pub fn completions_of<'a>(&'a self, user: &'a str) -> impl Iterator<Item = (Bucket, Vec<&'a str>)> + 'a {
        self.slots.iter().filter_map(move |(bucket, habits)| {
            let done: Vec<&str> = habits
                .iter()
                .filter(|(_, entry)| entry.contains(user))
                .map(|(name, _)| name.as_str())
                .collect();
            (!done.is_empty()).then_some((*bucket, done))
        })
    }

    /// Number of completions per bucket for `user`.
    pub fn history_for(&self, user: &str) -> Vec<BucketCount> {
        self.completions_of(user)
            .map(|(bucket, habits)| BucketCount {
                bucket,
                completed: habits.len(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Periodicity;
    use chrono::{NaiveDate, Utc};

    fn habit(name: &str, is_bonus: bool) -> Habit {
        Habit {
            name: name.into(),
            periodicity: Periodicity::Daily,
            created_at: Utc::now(),
            points: 10,
            is_bonus,
        }
    }

    fn day(d: u32) -> Bucket {
        Bucket::Day(NaiveDate::from_ymd_opt(2025, 3, d).unwrap())
    }

    #[test]
    fn test_bonus_is_first_come_first_served() {
        let mut ledger = CompletionLedger::new();
        let mut streaks = StreakTracker::new();
        let dishes = habit("Wash dishes", true);

        let receipt = ledger.record(&mut streaks, "Mamma", &dishes, day(18)).unwrap();
        assert!(receipt.first_claim);
        ledger.record(&mut streaks, "Kris", &dishes, day(19)).unwrap();

        let err = ledger.record(&mut streaks, "Len", &dishes, day(19)).unwrap_err();
        assert_eq!(
            err,
            TrackerError::BonusAlreadyClaimed {
                habit: "Wash dishes".into(),
                bucket: "2025-03-19".into(),
                claimed_by: "Kris".into(),
            }
        );
        assert_eq!(ledger.claimant(day(19), "Wash dishes"), Some("Kris"));
        assert_eq!(streaks.count("Len", "Wash dishes"), 0);
    }

    #[test]
    fn test_bonus_reclaim_by_same_user_is_already_completed() {
        let mut ledger = CompletionLedger::new();
        let mut streaks = StreakTracker::new();
        let dishes = habit("Wash dishes", true);
        ledger.record(&mut streaks, "Kris", &dishes, day(19)).unwrap();
        assert!(matches!(
            ledger.record(&mut streaks, "Kris", &dishes, day(19)),
            Err(TrackerError::AlreadyCompleted { .. })
        ));
    }

    #[test]
    fn test_ordinary_habit_is_per_user() {
        let mut ledger = CompletionLedger::new();
        let mut streaks = StreakTracker::new();
        let bed = habit("Make bed", false);

        let receipt = ledger.record(&mut streaks, "Kris", &bed, day(19)).unwrap();
        assert!(!receipt.first_claim);
        ledger.record(&mut streaks, "Len", &bed, day(19)).unwrap();
        assert!(ledger.has_completed("Kris", "Make bed", day(19)));
        assert!(ledger.has_completed("Len", "Make bed", day(19)));
        assert_eq!(ledger.claimant(day(19), "Make bed"), None);

        assert!(matches!(
            ledger.record(&mut streaks, "Len", &bed, day(19)),
            Err(TrackerError::AlreadyCompleted { .. })
        ));
    }

    #[test]
    fn test_failed_record_leaves_ledger_untouched() {
        let mut ledger = CompletionLedger::new();
        let mut streaks = StreakTracker::new();
        let dishes = habit("Wash dishes", true);
        ledger.record(&mut streaks, "Kris", &dishes, day(19)).unwrap();

        let (ledger_before, streaks_before) = (ledger.clone(), streaks.clone());
        let _ = ledger.record(&mut streaks, "Len", &dishes, day(19));
        assert_eq!(ledger, ledger_before);
        assert_eq!(streaks, streaks_before);
    }

    #[test]
    fn test_last_completed_and_history() {
        let mut ledger = CompletionLedger::new();
        let mut streaks = StreakTracker::new();
        let bed = habit("Make bed", false);
        let dishes = habit("Wash dishes", true);
        ledger.record(&mut streaks, "Kris", &bed, day(18)).unwrap();
        ledger.record(&mut streaks, "Kris", &dishes, day(18)).unwrap();
        ledger.record(&mut streaks, "Len", &bed, day(20)).unwrap();

        assert_eq!(ledger.last_completed("Make bed"), Some(day(20)));
        assert_eq!(ledger.last_completed("Wash dishes"), Some(day(18)));
        assert_eq!(ledger.last_completed("Read"), None);

        assert_eq!(ledger.last_completed_by("Kris", "Make bed"), Some(day(18)));
        assert_eq!(ledger.last_completed_by("Len", "Make bed"), Some(day(20)));
        assert_eq!(ledger.last_completed_by("Len", "Wash dishes"), None);

        assert_eq!(
            ledger.history_for("Kris"),
            vec![BucketCount {
                bucket: day(18),
                completed: 2
            }]
        );
    }

    #[test]
    fn test_entry_json_shapes() {
        assert_eq!(
            serde_json::to_string(&CompletionEntry::Claimed("Kris".into())).unwrap(),
            r#""Kris""#
        );
        let entry: CompletionEntry = serde_json::from_str(r#"["Kris","Len"]"#).unwrap();
        assert_eq!(entry.users(), vec!["Kris", "Len"]);
    }
}
