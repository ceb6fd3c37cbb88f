//! Core error types for housepoints-core.
//!
//! Domain failures live in [`TrackerError`]; persistence and configuration
//! failures have their own enums and are folded into [`CoreError`] at the
//! crate boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for housepoints-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Habit/household/leaderboard rule violations
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Data document errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rule violations raised by the habit/points/streak state machine.
///
/// Every variant is a user-facing failure; none of them leave partial state
/// behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Household '{0}' already exists")]
    DuplicateHousehold(String),

    #[error("Household '{0}' does not exist")]
    HouseholdNotFound(String),

    #[error("Household name cannot be empty")]
    EmptyHouseholdName,

    #[error("User '{user}' is already a member of household '{household}'")]
    DuplicateUser { user: String, household: String },

    #[error("User '{user}' already belongs to household '{household}'")]
    UserInOtherHousehold { user: String, household: String },

    #[error("User '{0}' is not a member of any household")]
    UserNotInHousehold(String),

    #[error("Habit '{0}' already exists")]
    DuplicateHabit(String),

    #[error("Habit name cannot be empty")]
    EmptyHabitName,

    #[error("Periodicity must be either 'daily' or 'weekly', got '{0}'")]
    InvalidPeriodicity(String),

    #[error("Points must be a positive integer, got {0}")]
    InvalidPoints(i64),

    #[error("Habit '{0}' not found")]
    HabitNotFound(String),

    #[error("Habit '{habit}' has already been completed by '{user}' for {bucket}")]
    AlreadyCompleted {
        user: String,
        habit: String,
        bucket: String,
    },

    #[error("Bonus habit '{habit}' was already claimed by '{claimed_by}' for {bucket}")]
    BonusAlreadyClaimed {
        habit: String,
        bucket: String,
        claimed_by: String,
    },
}

/// Data document errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read the data file
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the data file
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON for the expected layout
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document parsed but violates a data invariant
    #[error("Malformed document at {location}: {message}")]
    Malformed { location: String, message: String },
}

impl StoreError {
    pub(crate) fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Malformed {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
