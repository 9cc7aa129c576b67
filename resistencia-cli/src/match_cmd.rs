//! Match command - play one game between two teams
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_teams(), report_result()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use resistencia_core::{GameConfig, GameOutcome, Side, SideReport, Team};
use resistencia_tournament::{MatchRunner, RuleMatchRunner};

use crate::common::GameOptions;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Team playing side A (moves first)
    #[arg(long, value_name = "FILE")]
    pub home: PathBuf,

    /// Team playing side B
    #[arg(long, value_name = "FILE")]
    pub away: PathBuf,

    /// Write the turn-by-turn game log to this file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    #[command(flatten)]
    pub game: GameOptions,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MatchReport<'a> {
    home: &'a str,
    away: &'a str,
    winner: Option<&'a str>,
    #[serde(flatten)]
    outcome: &'a GameOutcome,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
pub fn run(args: MatchArgs) -> Result<()> {
    let (home, away) = load_teams(&args)?;
    let config = args.game.apply(GameConfig::default());

    tracing::info!("Starting match: {} vs {}", home.name, away.name);

    let mut runner = RuleMatchRunner::new(config);
    let outcome = runner
        .play(&home, &away, args.log.as_deref())
        .with_context(|| format!("Match {} vs {} failed", home.name, away.name))?;

    report_result(&home, &away, &outcome, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_teams(args: &MatchArgs) -> Result<(Team, Team)> {
    let home = Team::from_path(&args.home)
        .with_context(|| format!("Invalid home team: {}", args.home.display()))?;
    let away = Team::from_path(&args.away)
        .with_context(|| format!("Invalid away team: {}", args.away.display()))?;
    Ok((home, away))
}

fn report_result(home: &Team, away: &Team, outcome: &GameOutcome, json: bool) -> Result<()> {
    let winner = outcome.winner().map(|side| match side {
        Side::A => home.name.as_str(),
        Side::B => away.name.as_str(),
    });

    if json {
        let report = MatchReport {
            home: &home.name,
            away: &away.name,
            winner,
            outcome,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n=== Match Result ===");
    println!("{} (A) vs {} (B)", home.name, away.name);
    match winner {
        Some(name) => println!("Winner:  {}", name),
        None => println!("Draw"),
    }
    println!("Turns:   {} ({:?})", outcome.turns, outcome.reason);
    print_side(&home.name, outcome.report(Side::A));
    print_side(&away.name, outcome.report(Side::B));
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_side(name: &str, report: &SideReport) {
    let death = report
        .max_value_death
        .map(|turn| format!("turn {}", turn))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<20} pieces: {:>2}  value: {:>3}  top piece lost: {}",
        name, report.pieces, report.value, death
    );
}
