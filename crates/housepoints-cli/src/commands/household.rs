//! Household commands for CLI.

use serde_json::json;

use super::Session;

pub fn create(session: &mut Session, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    session.apply(|t| t.create_household(name))?;
    session.print(&json!({ "household": name }), || {
        println!("Household '{name}' created.");
    })?;
    Ok(())
}

pub fn add_user(
    session: &mut Session,
    user: &str,
    household: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    session.apply(|t| t.add_user(user, household))?;
    session.print(&json!({ "user": user, "household": household }), || {
        println!("User '{user}' added to household '{household}'.");
    })?;
    Ok(())
}
