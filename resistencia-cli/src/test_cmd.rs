//! Test command - one team against a gauntlet of opponents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), report_stats()

use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use resistencia_core::team::team_name_from_path;
use resistencia_tournament::{RuleMatchRunner, SuiteConfig, SuiteStats, TestSuite};

use crate::common::{ensure_dir, progress_bar, timestamped_filename, GameOptions};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TestArgs {
    /// Team under test
    #[arg(long, value_name = "FILE")]
    pub main: PathBuf,

    /// Opponent team files
    #[arg(required = true, value_name = "OPPONENT_FILE")]
    pub opponents: Vec<PathBuf>,

    /// Passes over the opponent list; sides alternate every pass
    #[arg(long, default_value = "2")]
    pub rounds: usize,

    /// Statistics CSV (default: timestamped file in --games-path)
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Directory for the statistics file and game logs
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub games_path: PathBuf,

    /// Also write one game log per match into --games-path
    #[arg(long)]
    pub game_logs: bool,

    #[command(flatten)]
    pub game: GameOptions,

    /// Output statistics as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run test command
pub fn run(args: TestArgs) -> Result<()> {
    let config = build_config(&args)?;
    let runner = RuleMatchRunner::new(config.match_config.clone());
    let mut suite = TestSuite::new(&args.main, args.opponents.iter(), &config, runner)
        .context("Failed to set up the test suite")?;

    tracing::info!(
        "Testing {} against {} opponents ({} rounds)",
        suite.main_team(),
        suite.opponents().len(),
        args.rounds
    );

    let bar = progress_bar(suite.get_number_of_games(), "games")?;
    let stats = suite.run_test_suite(|progress| {
        bar.inc(1);
        bar.set_message(format!("{} as {}", progress.row.opponent, progress.row.side.as_str()));
        ControlFlow::Continue(())
    })?;
    bar.finish_and_clear();

    report_stats(&stats, &suite.stats_path().display().to_string(), args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &TestArgs) -> Result<SuiteConfig> {
    let dir = ensure_dir(&args.games_path)?;
    let stats_path = match &args.stats {
        Some(path) => path.clone(),
        None => {
            let main = team_name_from_path(&args.main).unwrap_or_else(|| "team".to_string());
            dir.join(timestamped_filename(&format!("stats_{}", main), "csv"))
        }
    };

    let mut config = SuiteConfig::new(args.rounds, stats_path);
    if args.game_logs {
        config = config.with_games_dir(dir);
    }
    config.match_config = args.game.apply(config.match_config);
    Ok(config)
}

fn report_stats(stats: &SuiteStats, stats_path: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    let games = stats.games().max(1) as f32;
    println!("\n=== Test Results ===");
    println!("Games:   {}", stats.games());
    println!("Wins:    {} ({:.1}%)", stats.wins, stats.wins as f32 / games * 100.0);
    println!("Losses:  {} ({:.1}%)", stats.losses, stats.losses as f32 / games * 100.0);
    println!("Draws:   {} ({:.1}%)", stats.draws, stats.draws as f32 / games * 100.0);
    if stats.wins > 0 {
        println!("Avg turns to win:  {:.1}", stats.turns_winning as f32 / stats.wins as f32);
    }
    if stats.losses > 0 {
        println!("Avg turns to lose: {:.1}", stats.turns_losing as f32 / stats.losses as f32);
    }
    println!("Stats:   {}", stats_path);
    Ok(())
}
