//! Append-only tournament log
//!
//! Level 4 - Utilities

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::LeagueError;

/// Line closing every round block
pub const ROUND_SEPARATOR: &str = "-------------------------------";

/// The tournament log file. Each round is added as a single block.
#[derive(Clone, Debug)]
pub struct TournamentLog {
    path: PathBuf,
}

impl TournamentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `Ronda {number}:`, the round body and the separator in one write
    pub fn append_round(&self, number: usize, body: &[u8]) -> Result<(), LeagueError> {
        let block = round_block(number, body);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                file.write_all(&block)?;
                file.flush()
            })
            .map_err(|source| LeagueError::LogWriteFailed {
                path: self.path.clone(),
                source,
            })
    }
}

fn round_block(number: usize, body: &[u8]) -> Vec<u8> {
    let mut block = format!("Ronda {}:\n", number).into_bytes();
    block.extend_from_slice(body);
    block.extend_from_slice(ROUND_SEPARATOR.as_bytes());
    block.push(b'\n');
    block
}
