//! Habit commands for CLI.

use chrono::{Local, NaiveDate, Utc};

use super::Session;

pub fn add(
    session: &mut Session,
    name: &str,
    periodicity: &str,
    points: i64,
    bonus: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let habit = session.apply(|t| {
        if bonus {
            t.add_bonus_habit(name, periodicity, points, now)
        } else {
            t.add_habit(name, periodicity, points, now)
        }
    })?;
    session.print(&habit, || {
        let kind = if habit.is_bonus { "Bonus habit" } else { "Habit" };
        println!(
            "{kind} '{}' added ({}, {} points).",
            habit.name, habit.periodicity, habit.points
        );
    })?;
    Ok(())
}

pub fn complete(
    session: &mut Session,
    user: &str,
    habit: &str,
    date: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let on = date.unwrap_or_else(|| Local::now().date_naive());
    let outcome = session.apply(|t| t.complete_habit(user, habit, on))?;
    session.print(&outcome, || {
        println!(
            "{} completed '{}' for {}: +{} points (streak {}).",
            outcome.user, outcome.habit, outcome.bucket, outcome.award.total, outcome.streak
        );
        if outcome.award.streak_bonus > 0 {
            println!("Streak milestone! +{} bonus points.", outcome.award.streak_bonus);
        }
        println!("Total points: {}", outcome.total_points);
    })?;
    Ok(())
}

pub fn list(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let habits = session.tracker().list_habits();
    session.print(&habits, || {
        if habits.is_empty() {
            println!("No habits defined.");
            return;
        }
        for summary in &habits {
            let habit = &summary.habit;
            let bonus = if habit.is_bonus { " [bonus]" } else { "" };
            let last = summary
                .last_completed
                .map_or_else(|| "never".to_string(), |b| b.to_string());
            println!(
                "{}{bonus}: {}, {} points, last completed {last}",
                habit.name, habit.periodicity, habit.points
            );
        }
    })?;
    Ok(())
}
