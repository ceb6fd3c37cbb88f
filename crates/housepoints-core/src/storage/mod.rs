mod config;
pub mod document;
mod store;

pub use config::{Config, StorageConfig};
pub use document::Document;
pub use store::DataStore;

use std::path::PathBuf;

/// Returns `~/.config/housepoints[-dev]/` based on HOUSEPOINTS_ENV.
///
/// Set HOUSEPOINTS_ENV=dev to use development data directory.
/// HOUSEPOINTS_HOME, when set, is used as-is instead.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("HOUSEPOINTS_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HOUSEPOINTS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("housepoints-dev")
            } else {
                base_dir.join("housepoints")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
