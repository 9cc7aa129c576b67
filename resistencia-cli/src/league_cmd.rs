//! League command - round-robin tournament between team files
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_league(), report_results()
//! - Level 4: formatting utilities

use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use resistencia_tournament::{League, LeagueConfig, RuleMatchRunner};

use crate::common::{ensure_dir, progress_bar, standing_line, timestamped_filename, GameOptions};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct LeagueArgs {
    /// Team definition files (JSON); the file stem is the team name
    #[arg(required = true, num_args = 2.., value_name = "TEAM_FILE")]
    pub teams: Vec<PathBuf>,

    /// League configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the tournament log (timestamped name) and game logs
    #[arg(long, value_name = "DIR")]
    pub games_path: Option<PathBuf>,

    /// Also write one game log per match into --games-path
    #[arg(long, requires = "games_path")]
    pub game_logs: bool,

    /// Play a second leg with home and away swapped
    #[arg(long)]
    pub back_round: bool,

    #[command(flatten)]
    pub game: GameOptions,

    /// Output standings as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Standing {
    team: String,
    points: u32,
}

#[derive(Serialize)]
struct LeagueReport {
    rounds: usize,
    log: PathBuf,
    standings: Vec<Standing>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run league command
pub fn run(args: LeagueArgs) -> Result<()> {
    let config = build_config(&args)?;
    let runner = RuleMatchRunner::new(config.match_config.clone());
    let mut league = League::new(args.teams.iter(), &config, runner)
        .context("Failed to set up the league")?;

    tracing::info!(
        "Starting league: {} teams, {} rounds",
        league.teams().len(),
        league.get_number_of_rounds()
    );

    play_league(&mut league)?;
    report_results(&league, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &LeagueArgs) -> Result<LeagueConfig> {
    let mut config = match &args.config {
        Some(path) => LeagueConfig::load(path)?,
        None => LeagueConfig::default(),
    };

    if args.back_round {
        config.back_round = true;
    }
    if let Some(games_path) = &args.games_path {
        let dir = ensure_dir(games_path)?;
        config.log_path = dir.join(timestamped_filename("tournament", "txt"));
        if args.game_logs {
            config.games_dir = Some(dir);
        }
    }
    if let Some(dir) = &config.games_dir {
        ensure_dir(dir)?;
    }
    config.match_config = args.game.apply(config.match_config);

    Ok(config)
}

fn play_league(league: &mut League<RuleMatchRunner>) -> Result<()> {
    let total: usize = (0..league.get_number_of_rounds())
        .filter_map(|i| league.get_round(i))
        .map(|round| round.get_number_of_games())
        .sum();
    let bar = progress_bar(total, "matches")?;

    while !league.is_completed() {
        let summary = league.play_round_with_progress(|progress| {
            bar.inc(1);
            bar.set_message(progress.record.log_line(false));
            ControlFlow::Continue(())
        })?;
        if let Some(summary) = summary {
            bar.println(format!("Ronda {} jugada", summary.number));
        }
    }

    bar.finish_and_clear();
    Ok(())
}

fn report_results(league: &League<RuleMatchRunner>, json: bool) -> Result<()> {
    let standings: Vec<Standing> = league
        .classification()
        .into_iter()
        .map(|(team, points)| Standing { team, points })
        .collect();

    if json {
        let report = LeagueReport {
            rounds: league.get_number_of_rounds(),
            log: league.log_path().to_path_buf(),
            standings,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n=== Clasificación ===");
    for standing in &standings {
        println!("{}", standing_line(&standing.team, standing.points));
    }
    println!("\nLog: {}", league.log_path().display());
    Ok(())
}
