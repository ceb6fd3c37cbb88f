//! Points awarded for a completion.
//!
//! ```text
//! total = habit.points + (milestone_bonus if streak % milestone_every == 0)
//! ```
//!
//! With the default rules every 7th consecutive completion earns 5 extra
//! points. Setting `milestone_every` to 0 turns milestones off.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::habit::Habit;
use crate::household::HouseholdDirectory;

fn default_milestone_every() -> u32 {
    7
}
fn default_milestone_bonus() -> u64 {
    5
}

/// Streak milestone cadence and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Streak length multiple that triggers the bonus.
    #[serde(default = "default_milestone_every")]
    pub milestone_every: u32,
    /// Points added on a milestone completion.
    #[serde(default = "default_milestone_bonus")]
    pub milestone_bonus: u64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            milestone_every: default_milestone_every(),
            milestone_bonus: default_milestone_bonus(),
        }
    }
}

impl ScoringRules {
    pub fn is_milestone(&self, streak: u32) -> bool {
        self.milestone_every > 0 && streak > 0 && streak % self.milestone_every == 0
    }
}

/// Breakdown of one award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAward {
    pub base: u64,
    pub streak_bonus: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    rules: ScoringRules,
}

impl ScoringEngine {
    /// Create an engine with the default milestone rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Points a completion of `habit` at streak length `streak` is worth.
    pub fn award(&self, habit: &Habit, streak: u32) -> PointsAward {
        let base = habit.points;
        let streak_bonus = if self.rules.is_milestone(streak) {
            self.rules.milestone_bonus
        } else {
            0
        };
        PointsAward {
            base,
            streak_bonus,
            total: base.saturating_add(streak_bonus),
        }
    }

    /// Compute the award and credit it to the user's household total.
    ///
    /// Returns the award together with the user's new total.
    ///
    /// # Errors
    /// `UserNotInHousehold` if `user` has no household; nothing is credited.
    pub fn score_completion(
        &self,
        directory: &mut HouseholdDirectory,
        user: &str,
        habit: &Habit,
        streak: u32,
    ) -> Result<(PointsAward, u64), TrackerError> {
        let household = directory
            .household_of(user)
            .ok_or_else(|| TrackerError::UserNotInHousehold(user.to_string()))?
            .to_string();
        let award = self.award(habit, streak);
        let total = directory.credit(&household, user, award.total)?;
        Ok((award, total))
    }
}
