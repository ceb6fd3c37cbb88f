//! Household rankings and the monthly archive.
//!
//! Live rankings are always derived from the [`HouseholdDirectory`]; the
//! leaderboard itself only stores archived snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::household::HouseholdDirectory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub user: String,
    pub points: u64,
}

/// A household's ranking at the moment it was archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    /// Closing period, `YYYY-MM`.
    pub period: String,
    pub household: String,
    pub archived_at: DateTime<Utc>,
    pub rankings: Vec<RankEntry>,
}

impl RankingSnapshot {
    /// Every user sharing the highest score, or `None` for an empty snapshot.
    pub fn top_performers(&self) -> Option<TopPerformers> {
        let best = self.rankings.iter().map(|r| r.points).max()?;
        Some(TopPerformers {
            period: self.period.clone(),
            household: self.household.clone(),
            users: self
                .rankings
                .iter()
                .filter(|r| r.points == best)
                .map(|r| r.user.clone())
                .collect(),
            points: best,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPerformers {
    pub period: String,
    pub household: String,
    pub users: Vec<String>,
    pub points: u64,
}

/// Period tag for a reset performed on `date`.
pub fn closing_period(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    past_rankings: Vec<RankingSnapshot>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_archive(past_rankings: Vec<RankingSnapshot>) -> Self {
        Self { past_rankings }
    }

    pub(crate) fn archive(&self) -> &[RankingSnapshot] {
        &self.past_rankings
    }

    /// Members by points descending, ties by user ascending.
    pub fn current_ranking(
        &self,
        directory: &HouseholdDirectory,
        household: &str,
    ) -> Result<Vec<RankEntry>, TrackerError> {
        let entry = directory.get(household)?;
        let mut ranking: Vec<RankEntry> = entry
            .members
            .iter()
            .map(|user| RankEntry {
                user: user.clone(),
                points: entry.points_of(user),
            })
            .collect();
        ranking.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user.cmp(&b.user)));
        Ok(ranking)
    }

    /// Archive the household's ranking under `period`, then zero its totals.
    pub fn reset_monthly_scores(
        &mut self,
        directory: &mut HouseholdDirectory,
        household: &str,
        period: &str,
        now: DateTime<Utc>,
    ) -> Result<RankingSnapshot, TrackerError> {
        let rankings = self.current_ranking(directory, household)?;
        let snapshot = RankingSnapshot {
            period: period.to_string(),
            household: household.to_string(),
            archived_at: now,
            rankings,
        };
        directory.reset_points(household)?;
        self.past_rankings.push(snapshot.clone());
        Ok(snapshot)
    }

    /// Reset every household, in name order.
    pub fn reset_all(
        &mut self,
        directory: &mut HouseholdDirectory,
        period: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankingSnapshot>, TrackerError> {
        let names: Vec<String> = directory.names().map(str::to_string).collect();
        names
            .iter()
            .map(|name| self.reset_monthly_scores(directory, name, period, now))
            .collect()
    }

    /// Archived snapshots of `household`, oldest first.
    pub fn past_rankings(
        &self,
        directory: &HouseholdDirectory,
        household: &str,
    ) -> Result<Vec<&RankingSnapshot>, TrackerError> {
        directory.get(household)?;
        Ok(self
            .past_rankings
            .iter()
            .filter(|s| s.household == household)
            .collect())
    }

    /// Tie-inclusive winners of each archived period of `household`.
    pub fn top_performers(
        &self,
        directory: &HouseholdDirectory,
        household: &str,
    ) -> Result<Vec<TopPerformers>, TrackerError> {
        Ok(self
            .past_rankings(directory, household)?
            .into_iter()
            .filter_map(RankingSnapshot::top_performers)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ons4() -> HouseholdDirectory {
        let mut dir = HouseholdDirectory::new();
        dir.create_household("Ons4").unwrap();
        for (user, points) in [("Kris", 615), ("Len", 360), ("Mamma", 640)] {
            dir.add_user("Ons4", user).unwrap();
            dir.credit("Ons4", user, points).unwrap();
        }
        dir
    }

    fn pairs(ranking: &[RankEntry]) -> Vec<(&str, u64)> {
        ranking.iter().map(|r| (r.user.as_str(), r.points)).collect()
    }

    #[test]
    fn test_current_ranking_orders_by_points() {
        let dir = ons4();
        let board = Leaderboard::new();
        let ranking = board.current_ranking(&dir, "Ons4").unwrap();
        assert_eq!(
            pairs(&ranking),
            vec![("Mamma", 640), ("Kris", 615), ("Len", 360)]
        );
    }

    #[test]
    fn test_ties_break_by_user_name() {
        let mut dir = HouseholdDirectory::new();
        dir.create_household("H").unwrap();
        for user in ["zoe", "amy", "bob"] {
            dir.add_user("H", user).unwrap();
            dir.credit("H", user, 10).unwrap();
        }
        let board = Leaderboard::new();
        let first = board.current_ranking(&dir, "H").unwrap();
        assert_eq!(pairs(&first), vec![("amy", 10), ("bob", 10), ("zoe", 10)]);
        assert_eq!(board.current_ranking(&dir, "H").unwrap(), first);
    }

    #[test]
    fn test_unknown_household() {
        let board = Leaderboard::new();
        let dir = HouseholdDirectory::new();
        assert_eq!(
            board.current_ranking(&dir, "Nope"),
            Err(TrackerError::HouseholdNotFound("Nope".into()))
        );
        assert!(board.past_rankings(&dir, "Nope").is_err());
    }

    #[test]
    fn test_reset_archives_and_zeroes() {
        let mut dir = ons4();
        let mut board = Leaderboard::new();
        let before = board.current_ranking(&dir, "Ons4").unwrap();

        let snapshot = board
            .reset_monthly_scores(&mut dir, "Ons4", "2025-03", Utc::now())
            .unwrap();
        assert_eq!(snapshot.rankings, before);

        let past = board.past_rankings(&dir, "Ons4").unwrap();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].period, "2025-03");
        assert_eq!(past[0].rankings, before);
        assert!(board
            .current_ranking(&dir, "Ons4")
            .unwrap()
            .iter()
            .all(|r| r.points == 0));
    }

    #[test]
    fn test_top_performers_are_tie_inclusive() {
        let mut dir = ons4();
        let mut board = Leaderboard::new();
        board
            .reset_monthly_scores(&mut dir, "Ons4", "2025-03", Utc::now())
            .unwrap();

        dir.credit("Ons4", "Kris", 50).unwrap();
        dir.credit("Ons4", "Len", 50).unwrap();
        board
            .reset_monthly_scores(&mut dir, "Ons4", "2025-04", Utc::now())
            .unwrap();

        let top = board.top_performers(&dir, "Ons4").unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].users, vec!["Mamma"]);
        assert_eq!(top[0].points, 640);
        assert_eq!(top[1].period, "2025-04");
        assert_eq!(top[1].users, vec!["Kris", "Len"]);
    }

    #[test]
    fn test_empty_snapshot_has_no_top_performer() {
        let mut dir = HouseholdDirectory::new();
        dir.create_household("Empty").unwrap();
        let mut board = Leaderboard::new();
        board
            .reset_monthly_scores(&mut dir, "Empty", "2025-03", Utc::now())
            .unwrap();
        assert_eq!(board.past_rankings(&dir, "Empty").unwrap().len(), 1);
        assert!(board.top_performers(&dir, "Empty").unwrap().is_empty());
    }

    #[test]
    fn test_reset_all_covers_every_household() {
        let mut dir = ons4();
        dir.create_household("Cabin").unwrap();
        dir.add_user("Cabin", "Oma").unwrap();
        dir.credit("Cabin", "Oma", 3).unwrap();

        let mut board = Leaderboard::new();
        let snapshots = board.reset_all(&mut dir, "2025-03", Utc::now()).unwrap();
        let households: Vec<&str> = snapshots.iter().map(|s| s.household.as_str()).collect();
        assert_eq!(households, vec!["Cabin", "Ons4"]);
        assert_eq!(dir.get_points("Cabin", "Oma"), Ok(0));
    }

    #[test]
    fn test_reset_all_on_empty_directory() {
        let mut dir = HouseholdDirectory::new();
        let mut board = Leaderboard::new();
        assert_eq!(board.reset_all(&mut dir, "2025-03", Utc::now()), Ok(Vec::new()));
        assert!(board.archive().is_empty());
    }

    #[test]
    fn test_closing_period_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(closing_period(date), "2025-03");
    }
}
