//! Command handlers. Each tracker command runs against one [`Session`]:
//! load the data file, apply the operation, save if anything changed.

pub mod config;
pub mod data;
pub mod habit;
pub mod household;
pub mod leaderboard;
pub mod user;

use housepoints_core::{Config, CoreError, DataStore, HabitTracker, TrackerError};
use serde::Serialize;

pub struct Session {
    store: DataStore,
    tracker: HabitTracker,
    json: bool,
    dirty: bool,
}

impl Session {
    pub fn open(json: bool) -> Result<Self, CoreError> {
        let config = Config::load()?;
        let store = DataStore::from_config(&config)?;
        let tracker = store.load_tracker(config.scoring)?;
        Ok(Self {
            store,
            tracker,
            json,
            dirty: false,
        })
    }

    pub fn tracker(&self) -> &HabitTracker {
        &self.tracker
    }

    /// Apply a state change. The session is only marked for saving when
    /// the change succeeds.
    pub fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut HabitTracker) -> Result<T, TrackerError>,
    ) -> Result<T, TrackerError> {
        let value = op(&mut self.tracker)?;
        self.dirty = true;
        Ok(value)
    }

    /// Print `value` as JSON under `--json`, otherwise run `text`.
    pub fn print<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }

    pub fn finish(self) -> Result<(), Box<dyn std::error::Error>> {
        if self.dirty {
            self.store.save_tracker(&self.tracker)?;
        }
        Ok(())
    }
}
