//! The tracker context: every component of the engine behind one value.
//!
//! A [`HabitTracker`] is built from a loaded document at process start, has
//! exactly one operation applied to it, and is turned back into a document
//! for saving. Nothing here touches the filesystem.
//!
//! ## Completing a habit
//!
//! ```text
//! household_of(user) -> get_habit -> ledger.check -> streak.plan
//!     -> ledger.claim + streak.commit -> score_completion
//! ```
//!
//! Every fallible step runs before the first write, so a rejected completion
//! leaves streaks, the ledger and point totals exactly as they were.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::bucket::Bucket;
use crate::error::TrackerError;
use crate::habit::{Habit, HabitRegistry, Periodicity};
use crate::household::HouseholdDirectory;
use crate::leaderboard::{closing_period, Leaderboard, RankEntry, RankingSnapshot, TopPerformers};
use crate::ledger::{BucketCount, CompletionLedger};
use crate::scoring::{PointsAward, ScoringEngine, ScoringRules};
use crate::streak::{StreakEntry, StreakTracker};

/// What a successful `complete_habit` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    pub user: String,
    pub household: String,
    pub habit: String,
    pub is_bonus: bool,
    pub bucket: Bucket,
    pub streak: u32,
    pub first_claim: bool,
    pub award: PointsAward,
    pub total_points: u64,
}

/// A habit together with the latest bucket anyone completed it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: Habit,
    pub last_completed: Option<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BonusPoints {
    pub bucket: Bucket,
    pub points: u64,
}

/// Everything recorded about one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReport {
    pub user: String,
    pub household: String,
    pub points: u64,
    pub streaks: BTreeMap<String, StreakEntry>,
    pub history: Vec<BucketCount>,
    pub bonus_history: Vec<BonusPoints>,
}

#[derive(Debug, Clone, Default)]
pub struct HabitTracker {
    pub(crate) registry: HabitRegistry,
    pub(crate) directory: HouseholdDirectory,
    pub(crate) streaks: StreakTracker,
    pub(crate) ledger: CompletionLedger,
    pub(crate) leaderboard: Leaderboard,
    pub(crate) scoring: ScoringEngine,
}

impl HabitTracker {
    /// An empty tracker with default scoring rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ScoringRules) -> Self {
        Self {
            scoring: ScoringEngine::with_rules(rules),
            ..Self::default()
        }
    }

    pub fn set_rules(&mut self, rules: ScoringRules) {
        self.scoring = ScoringEngine::with_rules(rules);
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn registry(&self) -> &HabitRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &HouseholdDirectory {
        &self.directory
    }

    pub fn streaks(&self) -> &StreakTracker {
        &self.streaks
    }

    pub fn ledger(&self) -> &CompletionLedger {
        &self.ledger
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    // ── Households ───────────────────────────────────────────────────

    pub fn create_household(&mut self, name: &str) -> Result<(), TrackerError> {
        self.directory.create_household(name)
    }

    pub fn add_user(&mut self, user: &str, household: &str) -> Result<(), TrackerError> {
        self.directory.add_user(household, user)?;
        self.streaks.register_user(user);
        Ok(())
    }

    // ── Habits ───────────────────────────────────────────────────────

    pub fn add_habit(
        &mut self,
        name: &str,
        periodicity: &str,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<Habit, TrackerError> {
        let periodicity: Periodicity = periodicity.parse()?;
        self.registry.add_habit(name, periodicity, points, now)
    }

    pub fn add_bonus_habit(
        &mut self,
        name: &str,
        periodicity: &str,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<Habit, TrackerError> {
        let periodicity: Periodicity = periodicity.parse()?;
        self.registry.add_bonus_habit(name, periodicity, points, now)
    }

    pub fn list_habits(&self) -> Vec<HabitSummary> {
        self.registry
            .list_habits()
            .into_iter()
            .map(|habit| HabitSummary {
                last_completed: self.ledger.last_completed(&habit.name),
                habit: habit.clone(),
            })
            .collect()
    }

    /// Record that `user` completed `habit` on `on`.
    ///
    /// # Errors
    /// `UserNotInHousehold`, `HabitNotFound`, `AlreadyCompleted` or
    /// `BonusAlreadyClaimed`; on any of them nothing is changed.
    pub fn complete_habit(
        &mut self,
        user: &str,
        habit: &str,
        on: NaiveDate,
    ) -> Result<CompletionOutcome, TrackerError> {
        let household = self
            .directory
            .household_of(user)
            .ok_or_else(|| TrackerError::UserNotInHousehold(user.to_string()))?
            .to_string();
        let habit = self.registry.get_habit(habit)?.clone();
        let bucket = Bucket::containing(habit.periodicity, on);

        let receipt = self.ledger.record(&mut self.streaks, user, &habit, bucket)?;
        // Membership was resolved above, so crediting cannot fail here.
        let (award, total_points) =
            self.scoring
                .score_completion(&mut self.directory, user, &habit, receipt.streak)?;

        Ok(CompletionOutcome {
            user: user.to_string(),
            household,
            habit: habit.name,
            is_bonus: habit.is_bonus,
            bucket,
            streak: receipt.streak,
            first_claim: receipt.first_claim,
            award,
            total_points,
        })
    }

    // ── Leaderboard ──────────────────────────────────────────────────

    pub fn view_leaderboard(&self, household: &str) -> Result<Vec<RankEntry>, TrackerError> {
        self.leaderboard.current_ranking(&self.directory, household)
    }

    pub fn past_rankings(&self, household: &str) -> Result<Vec<RankingSnapshot>, TrackerError> {
        Ok(self
            .leaderboard
            .past_rankings(&self.directory, household)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn top_performers(&self, household: &str) -> Result<Vec<TopPerformers>, TrackerError> {
        self.leaderboard.top_performers(&self.directory, household)
    }

    /// Archive and zero one household, or every household when `household`
    /// is `None`. The archive entry is tagged with the month of `now`.
    pub fn reset_monthly_scores(
        &mut self,
        household: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankingSnapshot>, TrackerError> {
        let period = closing_period(now.date_naive());
        match household {
            Some(name) => Ok(vec![self.leaderboard.reset_monthly_scores(
                &mut self.directory,
                name,
                &period,
                now,
            )?]),
            None => self.leaderboard.reset_all(&mut self.directory, &period, now),
        }
    }

    // ── Reports ──────────────────────────────────────────────────────

    pub fn user_report(&self, user: &str) -> Result<UserReport, TrackerError> {
        let household = self
            .directory
            .household_of(user)
            .ok_or_else(|| TrackerError::UserNotInHousehold(user.to_string()))?;
        let points = self.directory.get_points(household, user)?;

        let bonus_history = self
            .ledger
            .completions_of(user)
            .filter_map(|(bucket, habits)| {
                let points: u64 = habits
                    .iter()
                    .filter_map(|name| self.registry.get_habit(name).ok())
                    .filter(|h| h.is_bonus)
                    .map(|h| h.points)
                    .sum();
                (points > 0).then_some(BonusPoints { bucket, points })
            })
            .collect();

        Ok(UserReport {
            user: user.to_string(),
            household: household.to_string(),
            points,
            streaks: self.streaks.for_user(user).cloned().unwrap_or_default(),
            history: self.ledger.history_for(user),
            bonus_history,
        })
    }

    /// Drop all state, keeping the scoring rules.
    pub fn clear(&mut self) {
        *self = Self::with_rules(*self.scoring.rules());
    }
}
