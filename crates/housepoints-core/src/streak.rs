//! Per-user, per-habit streak counters.
//!
//! A streak grows by one when a completion lands in the bucket right after
//! the previously recorded one, and restarts at 1 after any gap. A bucket on
//! the last representable date has no successor.
//!
//! ```text
//! (none) --complete--> 1
//! n@B    --complete@B.next()--> n+1
//! n@B    --complete@B--> AlreadyCompleted (unchanged)
//! n@B    --complete@other--> 1
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::TrackerError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakEntry {
    pub count: u32,
    #[serde(default)]
    pub longest: u32,
    /// Bucket of the latest completion. `None` for entries migrated from the
    /// bare-count layout, which never continue.
    #[serde(default)]
    pub last_bucket: Option<Bucket>,
}

impl StreakEntry {
    fn advanced_to(prior: Option<&StreakEntry>, bucket: Bucket) -> StreakEntry {
        let continues = prior
            .and_then(|p| p.last_bucket)
            .is_some_and(|last| last.next() == Some(bucket));
        let count = match prior {
            Some(p) if continues => p.count.saturating_add(1),
            _ => 1,
        };
        let longest = prior.map_or(0, |p| p.longest).max(count);
        StreakEntry {
            count,
            longest,
            last_bucket: Some(bucket),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakTracker {
    entries: BTreeMap<String, BTreeMap<String, StreakEntry>>,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(entries: BTreeMap<String, BTreeMap<String, StreakEntry>>) -> Self {
        Self { entries }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, BTreeMap<String, StreakEntry>> {
        &self.entries
    }

    pub fn get(&self, user: &str, habit: &str) -> Option<&StreakEntry> {
        self.entries.get(user)?.get(habit)
    }

    /// All streaks of a user keyed by habit name.
    pub fn for_user(&self, user: &str) -> Option<&BTreeMap<String, StreakEntry>> {
        self.entries.get(user)
    }

    /// Current count, 0 when the user never completed the habit.
    pub fn count(&self, user: &str, habit: &str) -> u32 {
        self.get(user, habit).map_or(0, |e| e.count)
    }

    /// Compute the entry a completion at `bucket` would produce without
    /// changing anything.
    ///
    /// # Errors
    /// `AlreadyCompleted` if `bucket` is the bucket already on record.
    pub fn plan(&self, user: &str, habit: &str, bucket: Bucket) -> Result<StreakEntry, TrackerError> {
        let prior = self.get(user, habit);
        if prior.and_then(|p| p.last_bucket) == Some(bucket) {
            return Err(TrackerError::AlreadyCompleted {
                user: user.to_string(),
                habit: habit.to_string(),
                bucket: bucket.to_string(),
            });
        }
        Ok(StreakEntry::advanced_to(prior, bucket))
    }

    pub fn commit(&mut self, user: &str, habit: &str, entry: StreakEntry) {
        self.entries
            .entry(user.to_string())
            .or_default()
            .insert(habit.to_string(), entry);
    }

    /// Plan and commit in one step, returning the new count.
    pub fn record(&mut self, user: &str, habit: &str, bucket: Bucket) -> Result<u32, TrackerError> {
        let entry = self.plan(user, habit, bucket)?;
        self.commit(user, habit, entry);
        Ok(entry.count)
    }

    /// Make sure `user` has a (possibly empty) row, as new members do.
    pub fn register_user(&mut self, user: &str) {
        self.entries.entry(user.to_string()).or_default();
    }
}
