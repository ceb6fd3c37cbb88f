//! Habit definitions and the registry that owns them.
//!
//! Ordinary and bonus habits live in two separate lists, but share one name
//! space: a name may appear in at most one of them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Daily,
    Weekly,
}

impl Periodicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Periodicity {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Periodicity::Daily),
            "weekly" => Ok(Periodicity::Weekly),
            _ => Err(TrackerError::InvalidPeriodicity(s.to_string())),
        }
    }
}

/// A recurring task worth a fixed number of points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub name: String,
    pub periodicity: Periodicity,
    #[serde(deserialize_with = "timestamp_lenient")]
    pub created_at: DateTime<Utc>,
    pub points: u64,
    #[serde(default)]
    pub is_bonus: bool,
}

/// RFC 3339, or a naive ISO timestamp read as UTC.
fn timestamp_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Stores habit definitions in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
    bonus_habits: Vec<Habit>,
}

impl HabitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from already-validated lists.
    pub(crate) fn from_parts(habits: Vec<Habit>, bonus_habits: Vec<Habit>) -> Self {
        Self {
            habits,
            bonus_habits,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Habit>, Vec<Habit>) {
        (self.habits, self.bonus_habits)
    }

    /// Register an ordinary habit.
    ///
    /// # Errors
    /// `EmptyHabitName`, `InvalidPoints`, or `DuplicateHabit`.
    pub fn add_habit(
        &mut self,
        name: &str,
        periodicity: Periodicity,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<Habit, TrackerError> {
        let habit = self.validate(name, periodicity, points, false, now)?;
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Register a bonus habit: claimable by one user per period.
    ///
    /// # Errors
    /// Same as [`HabitRegistry::add_habit`].
    pub fn add_bonus_habit(
        &mut self,
        name: &str,
        periodicity: Periodicity,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<Habit, TrackerError> {
        let habit = self.validate(name, periodicity, points, true, now)?;
        self.bonus_habits.push(habit.clone());
        Ok(habit)
    }

    fn validate(
        &self,
        name: &str,
        periodicity: Periodicity,
        points: i64,
        is_bonus: bool,
        now: DateTime<Utc>,
    ) -> Result<Habit, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyHabitName);
        }
        if points <= 0 {
            return Err(TrackerError::InvalidPoints(points));
        }
        if self.contains(name) {
            return Err(TrackerError::DuplicateHabit(name.to_string()));
        }
        Ok(Habit {
            name: name.to_string(),
            periodicity,
            created_at: now,
            points: points as u64,
            is_bonus,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn find(&self, name: &str) -> Option<&Habit> {
        self.habits
            .iter()
            .chain(self.bonus_habits.iter())
            .find(|h| h.name == name)
    }

    /// Look up a habit in either list.
    pub fn get_habit(&self, name: &str) -> Result<&Habit, TrackerError> {
        self.find(name.trim())
            .ok_or_else(|| TrackerError::HabitNotFound(name.trim().to_string()))
    }

    /// Ordinary habits then bonus habits, each in creation order.
    pub fn list_habits(&self) -> Vec<&Habit> {
        self.habits.iter().chain(self.bonus_habits.iter()).collect()
    }

    pub fn len(&self) -> usize {
        self.habits.len() + self.bonus_habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_add_habit_trims_name() {
        let mut registry = HabitRegistry::new();
        let habit = registry
            .add_habit("  Exercise  ", Periodicity::Daily, 5, now())
            .unwrap();
        assert_eq!(habit.name, "Exercise");
        assert!(!habit.is_bonus);
        assert!(registry.get_habit("Exercise").is_ok());
    }

    #[test]
    fn test_add_habit_rejects_empty_name() {
        let mut registry = HabitRegistry::new();
        assert_eq!(
            registry.add_habit("   ", Periodicity::Daily, 5, now()),
            Err(TrackerError::EmptyHabitName)
        );
    }

    #[test]
    fn test_add_habit_rejects_non_positive_points() {
        let mut registry = HabitRegistry::new();
        assert_eq!(
            registry.add_habit("Exercise", Periodicity::Daily, 0, now()),
            Err(TrackerError::InvalidPoints(0))
        );
        assert_eq!(
            registry.add_bonus_habit("Exercise", Periodicity::Daily, -5, now()),
            Err(TrackerError::InvalidPoints(-5))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected_across_lists() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Wash dishes", Periodicity::Daily, 10, now())
            .unwrap();
        assert_eq!(
            registry.add_bonus_habit("Wash dishes", Periodicity::Weekly, 10, now()),
            Err(TrackerError::DuplicateHabit("Wash dishes".into()))
        );

        registry
            .add_bonus_habit("Mow lawn", Periodicity::Weekly, 20, now())
            .unwrap();
        assert_eq!(
            registry.add_habit("Mow lawn", Periodicity::Weekly, 20, now()),
            Err(TrackerError::DuplicateHabit("Mow lawn".into()))
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_list_habits_keeps_creation_order_and_bonus_flag() {
        let mut registry = HabitRegistry::new();
        registry.add_bonus_habit("B1", Periodicity::Daily, 10, now()).unwrap();
        registry.add_habit("A1", Periodicity::Daily, 5, now()).unwrap();
        registry.add_habit("A2", Periodicity::Weekly, 7, now()).unwrap();

        let listed: Vec<(&str, bool)> = registry
            .list_habits()
            .iter()
            .map(|h| (h.name.as_str(), h.is_bonus))
            .collect();
        assert_eq!(listed, vec![("A1", false), ("A2", false), ("B1", true)]);
    }

    #[test]
    fn test_get_habit_not_found() {
        let registry = HabitRegistry::new();
        assert_eq!(
            registry.get_habit("Read").unwrap_err(),
            TrackerError::HabitNotFound("Read".into())
        );
    }

    #[test]
    fn test_habit_reads_naive_timestamps() {
        let habit: Habit = serde_json::from_str(
            r#"{"name":"Exercise","periodicity":"daily","created_at":"2025-03-18T09:15:02.123456","points":5,"is_bonus":false}"#,
        )
        .unwrap();
        assert_eq!(habit.created_at.to_rfc3339(), "2025-03-18T09:15:02.123456+00:00");

        let json = serde_json::to_string(&habit).unwrap();
        let back: Habit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, habit);
    }

    #[test]
    fn test_periodicity_parsing() {
        assert_eq!("daily".parse::<Periodicity>(), Ok(Periodicity::Daily));
        assert_eq!(" Weekly ".parse::<Periodicity>(), Ok(Periodicity::Weekly));
        assert_eq!(
            "monthly".parse::<Periodicity>(),
            Err(TrackerError::InvalidPeriodicity("monthly".into()))
        );
    }
}
