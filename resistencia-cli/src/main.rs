//! Resistencia CLI - Command-line interface
//!
//! Commands:
//! - league: Play a round-robin league between team files
//! - match: Play a single game between two teams
//! - test: Run one team against a gauntlet of opponents

mod common;
mod league_cmd;
mod match_cmd;
mod test_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resistencia")]
#[command(about = "Tournament scheduler and adjudicator for rule-based teams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a round-robin league
    League(league_cmd::LeagueArgs),
    /// Play a single game
    Match(match_cmd::MatchArgs),
    /// Test one team against a set of opponents
    Test(test_cmd::TestArgs),
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::League(args) => league_cmd::run(args),
        Commands::Match(args) => match_cmd::run(args),
        Commands::Test(args) => test_cmd::run(args),
    }
}
