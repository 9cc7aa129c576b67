//! Error types for tournament scheduling and adjudication

use std::path::PathBuf;

use resistencia_core::CoreError;

/// Errors raised while building or running a league or test suite
#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    #[error("A tournament needs at least 2 teams, got {0}")]
    TooFewTeams(usize),

    #[error("Two teams derive the same name: {0}")]
    DuplicateTeam(String),

    #[error("Team name {0} is reserved")]
    ReservedTeamName(String),

    #[error("Invalid team: {0}")]
    MalformedTeam(#[source] CoreError),

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Failed to write tournament log {}: {source}", path.display())]
    LogWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Match {home} vs {away} failed: {source}")]
    Match {
        home: String,
        away: String,
        source: CoreError,
    },

    #[error("Round {round} has no match {index}")]
    MatchIndexOutOfRange { round: usize, index: usize },

    #[error("Match {index} of round {round} was already played")]
    MatchAlreadyPlayed { round: usize, index: usize },

    #[error("Score tables do not cover the same teams")]
    ScoreKeyMismatch,

    #[error("Round {0} was cancelled")]
    Cancelled(usize),

    #[error("Failed to write statistics {}: {source}", path.display())]
    StatsWriteFailed { path: PathBuf, source: csv::Error },
}
