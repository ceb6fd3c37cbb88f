use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "housepoints", version, about = "Household habit tracker")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new household
    CreateHousehold {
        /// Household name
        name: String,
    },
    /// Add a user to a household
    AddUser {
        /// User name
        user: String,
        /// Household to join
        household: String,
    },
    /// Add an ordinary habit
    AddHabit {
        /// Habit name
        name: String,
        /// "daily" or "weekly"
        periodicity: String,
        /// Points per completion
        #[arg(allow_hyphen_values = true)]
        points: i64,
    },
    /// Add a bonus habit, claimable by one user per period
    AddBonusHabit {
        /// Habit name
        name: String,
        /// "daily" or "weekly"
        periodicity: String,
        /// Points per claim
        #[arg(allow_hyphen_values = true)]
        points: i64,
    },
    /// Record a habit completion
    CompleteHabit {
        /// User completing the habit
        user: String,
        /// Habit name
        habit: String,
        /// Completion date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// List all habits
    ListHabits,
    /// Show the current ranking of a household
    ViewLeaderboard {
        /// Household name
        household: String,
    },
    /// Show archived monthly rankings of a household
    ViewPastRankings {
        /// Household name
        household: String,
    },
    /// Show the winners of each archived month
    ViewTopPerformers {
        /// Household name
        household: String,
    },
    /// Archive current rankings and zero all points
    ResetMonthlyScores {
        /// Only reset this household
        household: Option<String>,
    },
    /// Show points, streaks and history of a user
    ViewUser {
        /// User name
        user: String,
    },
    /// Delete all households, habits and history
    ClearData,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    match cli.command {
        Commands::Config { action } => return commands::config::run(action, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "housepoints", &mut std::io::stdout());
            return Ok(());
        }
        Commands::ClearData => return commands::data::clear(json),
        _ => {}
    }

    let mut session = commands::Session::open(json)?;
    match cli.command {
        Commands::CreateHousehold { name } => commands::household::create(&mut session, &name)?,
        Commands::AddUser { user, household } => {
            commands::household::add_user(&mut session, &user, &household)?
        }
        Commands::AddHabit {
            name,
            periodicity,
            points,
        } => commands::habit::add(&mut session, &name, &periodicity, points, false)?,
        Commands::AddBonusHabit {
            name,
            periodicity,
            points,
        } => commands::habit::add(&mut session, &name, &periodicity, points, true)?,
        Commands::CompleteHabit { user, habit, date } => {
            commands::habit::complete(&mut session, &user, &habit, date)?
        }
        Commands::ListHabits => commands::habit::list(&session)?,
        Commands::ViewLeaderboard { household } => commands::leaderboard::current(&session, &household)?,
        Commands::ViewPastRankings { household } => commands::leaderboard::past(&session, &household)?,
        Commands::ViewTopPerformers { household } => {
            commands::leaderboard::top_performers(&session, &household)?
        }
        Commands::ResetMonthlyScores { household } => {
            commands::leaderboard::reset(&mut session, household.as_deref())?
        }
        Commands::ViewUser { user } => commands::user::view(&session, &user)?,
        Commands::Config { .. } | Commands::Completions { .. } | Commands::ClearData => {}
    }
    session.finish()
}

fn main() {
    init_logging();
    let matches = Cli::command().get_matches();
    let name = matches.subcommand_name().unwrap_or_default().to_string();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    match run(cli) {
        Ok(()) => tracing::info!(command = %name, "command completed"),
        Err(e) => {
            tracing::debug!(command = %name, error = %e, "command failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
