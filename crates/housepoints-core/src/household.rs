//! Household directory: members and their running point totals.
//!
//! The directory is the single owner of point totals. Scoring credits them,
//! the leaderboard reads and resets them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    /// Members in the order they joined.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub points: BTreeMap<String, u64>,
}

impl Household {
    pub fn is_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m == user)
    }

    pub fn points_of(&self, user: &str) -> u64 {
        self.points.get(user).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseholdDirectory {
    households: BTreeMap<String, Household>,
}

impl HouseholdDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(households: BTreeMap<String, Household>) -> Self {
        Self { households }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, Household> {
        &self.households
    }

    /// # Errors
    /// `EmptyHouseholdName` or `DuplicateHousehold`.
    pub fn create_household(&mut self, name: &str) -> Result<(), TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyHouseholdName);
        }
        if self.households.contains_key(name) {
            return Err(TrackerError::DuplicateHousehold(name.to_string()));
        }
        self.households.insert(name.to_string(), Household::default());
        Ok(())
    }

    /// Add `user` to `household` with a zero total.
    ///
    /// A user can belong to a single household, since completions are
    /// credited to the household the user is found in.
    pub fn add_user(&mut self, household: &str, user: &str) -> Result<(), TrackerError> {
        if !self.households.contains_key(household) {
            return Err(TrackerError::HouseholdNotFound(household.to_string()));
        }
        if let Some(current) = self.household_of(user) {
            let current = current.to_string();
            return Err(if current == household {
                TrackerError::DuplicateUser {
                    user: user.to_string(),
                    household: current,
                }
            } else {
                TrackerError::UserInOtherHousehold {
                    user: user.to_string(),
                    household: current,
                }
            });
        }

        let entry = self.get_mut(household)?;
        entry.members.push(user.to_string());
        entry.points.insert(user.to_string(), 0);
        Ok(())
    }

    pub fn get(&self, household: &str) -> Result<&Household, TrackerError> {
        self.households
            .get(household)
            .ok_or_else(|| TrackerError::HouseholdNotFound(household.to_string()))
    }

    fn get_mut(&mut self, household: &str) -> Result<&mut Household, TrackerError> {
        self.households
            .get_mut(household)
            .ok_or_else(|| TrackerError::HouseholdNotFound(household.to_string()))
    }

    /// Members of `household` in join order.
    pub fn members(&self, household: &str) -> Result<&[String], TrackerError> {
        Ok(&self.get(household)?.members)
    }

    pub fn get_points(&self, household: &str, user: &str) -> Result<u64, TrackerError> {
        let entry = self.get(household)?;
        if !entry.is_member(user) {
            return Err(TrackerError::UserNotInHousehold(user.to_string()));
        }
        Ok(entry.points_of(user))
    }

    /// Name of the household `user` belongs to, if any.
    pub fn household_of(&self, user: &str) -> Option<&str> {
        self.households
            .iter()
            .find(|(_, h)| h.is_member(user))
            .map(|(name, _)| name.as_str())
    }

    /// Add `points` to the user's total and return the new total.
    pub fn credit(&mut self, household: &str, user: &str, points: u64) -> Result<u64, TrackerError> {
        let entry = self.get_mut(household)?;
        if !entry.is_member(user) {
            return Err(TrackerError::UserNotInHousehold(user.to_string()));
        }
        let total = entry.points.entry(user.to_string()).or_insert(0);
        *total = total.saturating_add(points);
        Ok(*total)
    }

    /// Zero every member's total.
    pub fn reset_points(&mut self, household: &str) -> Result<(), TrackerError> {
        let entry = self.get_mut(household)?;
        for member in &entry.members {
            entry.points.insert(member.clone(), 0);
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.households.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.households.is_empty()
    }
}
