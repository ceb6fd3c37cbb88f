//! The persisted JSON document and its conversion to and from a
//! [`HabitTracker`].
//!
//! Loading is strict about invariants and lenient about layout: sections
//! missing from older files default to empty, bare streak counts and
//! single-user ordinary completions are migrated, and the old per-month
//! archive shape is split into per-household snapshots. Anything that breaks
//! an invariant is rejected with [`StoreError::Malformed`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::StoreError;
use crate::habit::{Habit, HabitRegistry};
use crate::household::{Household, HouseholdDirectory};
use crate::leaderboard::{Leaderboard, RankEntry, RankingSnapshot};
use crate::ledger::{CompletionEntry, CompletionLedger};
use crate::scoring::{ScoringEngine, ScoringRules};
use crate::streak::{StreakEntry, StreakTracker};
use crate::tracker::HabitTracker;

/// Streak as stored: current layout, or a bare count from older files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredStreak {
    Entry(StreakEntry),
    Count(u32),
}

/// Archive entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSnapshot {
    Snapshot(RankingSnapshot),
    /// One entry per month covering every household, month as `MM-YYYY`.
    Monthly {
        month: String,
        rankings: BTreeMap<String, BTreeMap<String, u64>>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSection {
    /// Derived on save, ignored on load.
    #[serde(default)]
    pub rankings: BTreeMap<String, BTreeMap<String, u64>>,
    #[serde(default)]
    pub past_rankings: Vec<StoredSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub households: BTreeMap<String, Household>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub bonus_habits: Vec<Habit>,
    #[serde(default)]
    pub leaderboard: LeaderboardSection,
    #[serde(default)]
    pub streaks: BTreeMap<String, BTreeMap<String, StoredStreak>>,
    #[serde(default)]
    pub completed_habits: BTreeMap<String, BTreeMap<String, CompletionEntry>>,
}

impl Document {
    /// Parse a document; blank input is the empty document.
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Snapshot a tracker into document form.
    pub fn from_tracker(tracker: &HabitTracker) -> Self {
        let households = tracker.directory.as_map().clone();
        let rankings = households
            .keys()
            .map(|name| {
                let ranking = tracker
                    .leaderboard
                    .current_ranking(&tracker.directory, name)
                    .unwrap_or_default();
                (
                    name.clone(),
                    ranking.into_iter().map(|r| (r.user, r.points)).collect(),
                )
            })
            .collect();

        let (habits, bonus_habits) = tracker.registry.clone().into_parts();

        Self {
            households,
            habits,
            bonus_habits,
            leaderboard: LeaderboardSection {
                rankings,
                past_rankings: tracker
                    .leaderboard
                    .archive()
                    .iter()
                    .cloned()
                    .map(StoredSnapshot::Snapshot)
                    .collect(),
            },
            streaks: tracker
                .streaks
                .as_map()
                .iter()
                .map(|(user, habits)| {
                    let habits = habits
                        .iter()
                        .map(|(habit, entry)| (habit.clone(), StoredStreak::Entry(*entry)))
                        .collect();
                    (user.clone(), habits)
                })
                .collect(),
            completed_habits: tracker
                .ledger
                .as_map()
                .iter()
                .map(|(bucket, slots)| (bucket.to_string(), slots.clone()))
                .collect(),
        }
    }

    /// Validate the document and build a tracker from it.
    pub fn into_tracker(self, rules: ScoringRules) -> Result<HabitTracker, StoreError> {
        let registry = validate_habits(self.habits, self.bonus_habits)?;
        let directory = validate_households(self.households)?;
        let ledger = validate_completions(self.completed_habits, &registry)?;
        let streaks = migrate_streaks(self.streaks, &ledger);
        let leaderboard = migrate_archive(self.leaderboard.past_rankings)?;

        Ok(HabitTracker {
            registry,
            directory,
            streaks,
            ledger,
            leaderboard,
            scoring: ScoringEngine::with_rules(rules),
        })
    }
}

fn validate_habits(habits: Vec<Habit>, bonus_habits: Vec<Habit>) -> Result<HabitRegistry, StoreError> {
    let mut seen = BTreeSet::new();
    for (list, expect_bonus) in [("habits", false), ("bonus_habits", true)] {
        let entries = if expect_bonus { &bonus_habits } else { &habits };
        for habit in entries {
            let at = format!("{list}.{}", habit.name);
            if habit.name.trim().is_empty() || habit.name.trim() != habit.name {
                return Err(StoreError::malformed(at, "habit name must be non-empty and trimmed"));
            }
            if habit.points == 0 {
                return Err(StoreError::malformed(at, "points must be positive"));
            }
            if habit.is_bonus != expect_bonus {
                return Err(StoreError::malformed(at, "is_bonus does not match the list it is in"));
            }
            if !seen.insert(habit.name.clone()) {
                return Err(StoreError::malformed(at, "duplicate habit name"));
            }
        }
    }
    Ok(HabitRegistry::from_parts(habits, bonus_habits))
}

fn validate_households(
    mut households: BTreeMap<String, Household>,
) -> Result<HouseholdDirectory, StoreError> {
    let mut owner: BTreeMap<String, String> = BTreeMap::new();
    for (name, household) in households.iter_mut() {
        for member in &household.members {
            if let Some(other) = owner.insert(member.clone(), name.clone()) {
                let message = if &other == name {
                    "member listed twice".to_string()
                } else {
                    format!("member also belongs to household '{other}'")
                };
                return Err(StoreError::malformed(format!("households.{name}.{member}"), message));
            }
        }
        if let Some(stray) = household.points.keys().find(|u| !household.is_member(u)) {
            return Err(StoreError::malformed(
                format!("households.{name}.points.{stray}"),
                "points recorded for a non-member",
            ));
        }
        for member in &household.members {
            household.points.entry(member.clone()).or_insert(0);
        }
    }
    Ok(HouseholdDirectory::from_map(households))
}

/// Bare counts pick up their last bucket from the ledger so the next
/// completion can continue them.
fn migrate_streaks(
    streaks: BTreeMap<String, BTreeMap<String, StoredStreak>>,
    ledger: &CompletionLedger,
) -> StreakTracker {
    let entries = streaks
        .into_iter()
        .map(|(user, habits)| {
            let habits = habits
                .into_iter()
                .map(|(habit, stored)| {
                    let entry = match stored {
                        StoredStreak::Entry(entry) => entry,
                        StoredStreak::Count(count) => {
                            let last_bucket = ledger.last_completed_by(&user, &habit);
                            tracing::debug!(
                                %user,
                                %habit,
                                count,
                                last_bucket = ?last_bucket.map(|b| b.to_string()),
                                "migrating bare streak count"
                            );
                            StreakEntry {
                                count,
                                longest: count,
                                last_bucket,
                            }
                        }
                    };
                    (habit, entry)
                })
                .collect();
            (user, habits)
        })
        .collect();
    StreakTracker::from_map(entries)
}

fn validate_completions(
    completed: BTreeMap<String, BTreeMap<String, CompletionEntry>>,
    registry: &HabitRegistry,
) -> Result<CompletionLedger, StoreError> {
    let mut slots: BTreeMap<Bucket, BTreeMap<String, CompletionEntry>> = BTreeMap::new();
    for (key, habits) in completed {
        let bucket = parse_bucket_key(&key)?;
        let mut migrated = BTreeMap::new();
        for (name, entry) in habits {
            let at = format!("completed_habits.{key}.{name}");
            let habit = registry
                .get_habit(&name)
                .map_err(|_| StoreError::malformed(&at, "unknown habit"))?;
            if habit.periodicity != bucket.periodicity() {
                return Err(StoreError::malformed(
                    &at,
                    format!("{} habit recorded under a {} bucket", habit.periodicity, bucket.periodicity()),
                ));
            }
            let entry = match (habit.is_bonus, entry) {
                (true, CompletionEntry::Claimed(user)) => CompletionEntry::Claimed(user),
                (true, CompletionEntry::Completed(mut users)) if users.len() == 1 => {
                    CompletionEntry::Claimed(users.remove(0))
                }
                (true, CompletionEntry::Completed(_)) => {
                    return Err(StoreError::malformed(&at, "bonus slot must have exactly one claimant"));
                }
                (false, CompletionEntry::Claimed(user)) => CompletionEntry::Completed(vec![user]),
                (false, CompletionEntry::Completed(users)) => {
                    let unique: BTreeSet<&String> = users.iter().collect();
                    if unique.len() != users.len() {
                        return Err(StoreError::malformed(&at, "user listed twice"));
                    }
                    CompletionEntry::Completed(users)
                }
            };
            migrated.insert(name, entry);
        }
        let merged = slots.entry(bucket).or_default();
        for (name, entry) in migrated {
            if merged.contains_key(&name) {
                return Err(StoreError::malformed(
                    format!("completed_habits.{key}.{name}"),
                    format!("another key already records this habit for {bucket}"),
                ));
            }
            merged.insert(name, entry);
        }
    }
    Ok(CompletionLedger::from_map(slots))
}

/// Day or ISO week key, falling back to `%W` week numbering for weekly keys
/// that have no ISO reading (week `00`, or week `53` of a 52-week year).
fn parse_bucket_key(key: &str) -> Result<Bucket, StoreError> {
    key.parse::<Bucket>().or_else(|e| match Bucket::from_monday_week(key) {
        Some(bucket) => {
            tracing::debug!(%key, %bucket, "re-keying %W week bucket");
            Ok(bucket)
        }
        None => Err(StoreError::malformed(format!("completed_habits.{key}"), e.to_string())),
    })
}

fn migrate_archive(past: Vec<StoredSnapshot>) -> Result<Leaderboard, StoreError> {
    let mut snapshots = Vec::new();
    for (index, stored) in past.into_iter().enumerate() {
        match stored {
            StoredSnapshot::Snapshot(snapshot) => snapshots.push(snapshot),
            StoredSnapshot::Monthly { month, rankings } => {
                let first_day = NaiveDate::parse_from_str(&format!("01-{month}"), "%d-%m-%Y")
                    .map_err(|_| {
                        StoreError::malformed(
                            format!("leaderboard.past_rankings[{index}].month"),
                            format!("expected MM-YYYY, got '{month}'"),
                        )
                    })?;
                let archived_at = first_day.and_time(NaiveTime::MIN).and_utc();
                tracing::debug!(%month, households = rankings.len(), "migrating monthly archive entry");
                for (household, points) in rankings {
                    let mut ranking: Vec<RankEntry> = points
                        .into_iter()
                        .map(|(user, points)| RankEntry { user, points })
                        .collect();
                    ranking.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user.cmp(&b.user)));
                    snapshots.push(RankingSnapshot {
                        period: first_day.format("%Y-%m").to_string(),
                        household,
                        archived_at,
                        rankings: ranking,
                    });
                }
            }
        }
    }
    Ok(Leaderboard::from_archive(snapshots))
}
