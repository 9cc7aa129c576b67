//! Error types for the core crate

use std::path::PathBuf;

use crate::registry::RuleError;

/// Errors raised while loading teams, playing games or writing game logs
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed team definition {}: {reason}", path.display())]
    MalformedTeam { path: PathBuf, reason: String },

    #[error("Failed to read team definition {}: {source}", path.display())]
    TeamRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse team definition {}: {source}", path.display())]
    TeamParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Game log write failed for {}: {source}", path.display())]
    GameLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Rule(#[from] RuleError),
}
