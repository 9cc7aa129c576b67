//! Resistencia Tournament - scheduling and adjudication of tournaments
//!
//! This crate provides tournament infrastructure:
//! - Round-robin pairing with a ghost team for odd team counts
//! - League state machine advancing one atomic round at a time
//! - Score tables, merging and ranking
//! - Gauntlet test suites with CSV statistics
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: League, TestSuite (orchestration)
//! - Level 2: Round, MatchRunner (phases)
//! - Level 3: make_pairings, gauntlet_pairing (steps)
//! - Level 4: score tables, tournament log, configuration

mod config;
mod error;
mod league;
mod match_play;
mod pairing;
mod round;
mod scores;
mod test_suite;
mod tournament_log;
mod translation;

pub use config::{LeagueConfig, ScoringConfig, SuiteConfig, DEFAULT_LOG_FILE, DEFAULT_STATS_FILE};
pub use error::LeagueError;
pub use league::{League, MatchProgress, RoundSummary};
pub use match_play::{MatchRunner, RuleMatchRunner};
pub use pairing::{gauntlet_pairing, is_ghost, make_pairings, Pairing, RoundPairings, GHOST_TEAM};
pub use round::{game_log_name, MatchKind, MatchRecord, Round};
pub use scores::ScoreTable;
pub use test_suite::{MatchResult, SuiteProgress, SuiteRow, SuiteStats, TestSuite};
pub use tournament_log::{TournamentLog, ROUND_SEPARATOR};
pub use translation::TranslationTable;
