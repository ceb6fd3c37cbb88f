//! User report command for CLI.

use super::Session;

pub fn view(session: &Session, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = session.tracker().user_report(user)?;
    session.print(&report, || {
        println!("{} ({}): {} points", report.user, report.household, report.points);
        if !report.streaks.is_empty() {
            println!("Streaks:");
            for (habit, streak) in &report.streaks {
                println!("  {habit}: {} (longest {})", streak.count, streak.longest);
            }
        }
        if !report.history.is_empty() {
            println!("Completions:");
            for day in &report.history {
                println!("  {}: {}", day.bucket, day.completed);
            }
        }
        if !report.bonus_history.is_empty() {
            println!("Bonus points:");
            for bonus in &report.bonus_history {
                println!("  {}: {}", bonus.bucket, bonus.points);
            }
        }
    })?;
    Ok(())
}
