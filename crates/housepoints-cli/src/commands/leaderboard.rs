//! Leaderboard commands for CLI.

use chrono::Utc;
use housepoints_core::RankEntry;

use super::Session;

fn print_ranking(ranking: &[RankEntry]) {
    for (i, entry) in ranking.iter().enumerate() {
        println!("{}. {}: {} points", i + 1, entry.user, entry.points);
    }
}

pub fn current(session: &Session, household: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ranking = session.tracker().view_leaderboard(household)?;
    session.print(&ranking, || {
        println!("Leaderboard for {household}:");
        if ranking.is_empty() {
            println!("No members yet.");
        }
        print_ranking(&ranking);
    })?;
    Ok(())
}

pub fn past(session: &Session, household: &str) -> Result<(), Box<dyn std::error::Error>> {
    let snapshots = session.tracker().past_rankings(household)?;
    session.print(&snapshots, || {
        if snapshots.is_empty() {
            println!("No past rankings for {household}.");
        }
        for snapshot in &snapshots {
            println!("{} ({}):", snapshot.period, snapshot.household);
            print_ranking(&snapshot.rankings);
        }
    })?;
    Ok(())
}

pub fn top_performers(session: &Session, household: &str) -> Result<(), Box<dyn std::error::Error>> {
    let winners = session.tracker().top_performers(household)?;
    session.print(&winners, || {
        if winners.is_empty() {
            println!("No top performers for {household} yet.");
        }
        for top in &winners {
            println!("{}: {} with {} points", top.period, top.users.join(", "), top.points);
        }
    })?;
    Ok(())
}

pub fn reset(session: &mut Session, household: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let archived = session.apply(|t| t.reset_monthly_scores(household, now))?;
    session.print(&archived, || {
        for snapshot in &archived {
            println!(
                "Archived {} rankings for {} and reset points.",
                snapshot.period, snapshot.household
            );
        }
        if archived.is_empty() {
            println!("No households to reset.");
        }
    })?;
    Ok(())
}
