//! JSON file backing the tracker between invocations.

use std::path::{Path, PathBuf};

use super::{Config, Document};
use crate::error::{CoreError, StoreError};
use crate::scoring::ScoringRules;
use crate::tracker::HabitTracker;

/// The data document on disk.
#[derive(Debug, Clone)]
pub struct DataStore {
    path: PathBuf,
}

impl DataStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the location named by `config`.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        Ok(Self::open(config.data_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing or blank file is the empty document.
    pub fn load(&self) -> Result<Document, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no data file yet, starting empty");
                return Ok(Document::default());
            }
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let doc = Document::from_json(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            households = doc.households.len(),
            habits = doc.habits.len() + doc.bonus_habits.len(),
            "loaded data file"
        );
        Ok(doc)
    }

    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let write_failed = |source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        std::fs::write(&self.path, doc.to_json()?).map_err(write_failed)?;
        tracing::debug!(path = %self.path.display(), "saved data file");
        Ok(())
    }

    /// Overwrite the file with the empty document.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.save(&Document::default())
    }

    pub fn load_tracker(&self, rules: ScoringRules) -> Result<HabitTracker, StoreError> {
        self.load()?.into_tracker(rules)
    }

    pub fn save_tracker(&self, tracker: &HabitTracker) -> Result<(), StoreError> {
        self.save(&Document::from_tracker(tracker))
    }
}
