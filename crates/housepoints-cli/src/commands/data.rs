//! Data file maintenance commands for CLI.

use housepoints_core::{Config, DataStore};
use serde_json::json;

/// Reset the data file to an empty document.
pub fn clear(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = DataStore::from_config(&config)?;
    store.clear()?;
    tracing::info!(path = %store.path().display(), "data cleared");
    if json {
        println!("{}", json!({ "cleared": store.path() }));
    } else {
        println!("All data cleared.");
    }
    Ok(())
}
