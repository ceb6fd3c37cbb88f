//! # Housepoints Core Library
//!
//! Core business logic for the household habit tracker. Every operation is
//! available through the standalone `housepoints` CLI, which is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Habits**: Named daily or weekly tasks worth a fixed number of points.
//!   Bonus habits can be claimed by only one user per period.
//! - **Households**: Groups of users with a running point balance each.
//! - **Streaks**: Consecutive-period counters per user and habit, with a
//!   milestone bonus every few periods.
//! - **Leaderboard**: Current rankings, monthly archives and top performers.
//! - **Storage**: JSON data document and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: The aggregate that owns all state and enforces the rules
//! - [`DataStore`]: Loads and saves the tracker as a JSON document
//! - [`Config`]: Application configuration management

pub mod bucket;
pub mod error;
pub mod habit;
pub mod household;
pub mod leaderboard;
pub mod ledger;
pub mod scoring;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use bucket::Bucket;
pub use error::{ConfigError, CoreError, StoreError, TrackerError};
pub use habit::{Habit, HabitRegistry, Periodicity};
pub use household::{Household, HouseholdDirectory};
pub use leaderboard::{Leaderboard, RankEntry, RankingSnapshot, TopPerformers};
pub use ledger::{BucketCount, CompletionEntry, CompletionLedger};
pub use scoring::{PointsAward, ScoringEngine, ScoringRules};
pub use storage::{Config, DataStore, Document};
pub use streak::{StreakEntry, StreakTracker};
pub use tracker::{BonusPoints, CompletionOutcome, HabitSummary, HabitTracker, UserReport};
