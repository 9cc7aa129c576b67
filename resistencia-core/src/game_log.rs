//! Append-only game log
//!
//! Two record kinds are written:
//! - a turn marker, `tiempo <n>`
//! - a piece disclosure line, `e:<team> n:<id> p:<value> x:<x> y:<y> d:<covered>`
//!
//! The same formatting backs both the [`GameLogWriter`] used by the game
//! loop and the `a-fichero-*` host callbacks exposed through the registry.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::board::Side;
use crate::error::CoreError;

/// One piece as it is disclosed in the log
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceRecord<'a> {
    pub team: Side,
    pub id: &'a str,
    pub value: i64,
    pub x: i64,
    pub y: i64,
    /// Hidden from the rival
    pub covered: bool,
}

/// Format a turn marker line
pub fn format_turn(turn: i64) -> String {
    format!("tiempo {}\n", turn)
}

/// Format a piece disclosure line from raw tokens
pub fn format_piece_tokens(
    team: &str,
    nid: &str,
    value: &str,
    x: &str,
    y: &str,
    covered: &str,
) -> String {
    format!("e:{} n:{} p:{} x:{} y:{} d:{}\n", team, nid, value, x, y, covered)
}

/// Format a piece disclosure line
pub fn format_piece(record: &PieceRecord<'_>) -> String {
    format_piece_tokens(
        record.team.as_str(),
        record.id,
        &record.value.to_string(),
        &record.x.to_string(),
        &record.y.to_string(),
        if record.covered { "1" } else { "0" },
    )
}

/// Buffered appender for a single game log file
pub struct GameLogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl GameLogWriter {
    /// Open (or create) a log file in append mode
    pub fn append(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::open(path.as_ref(), OpenOptions::new().create(true).append(true))
    }

    /// Start a fresh log file, discarding anything already at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::open(path.as_ref(), OpenOptions::new().create(true).write(true).truncate(true))
    }

    fn open(path: &Path, options: &OpenOptions) -> Result<Self, CoreError> {
        let file = options.open(path).map_err(|source| CoreError::GameLog {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the start of a turn
    pub fn new_turn(&mut self, turn: i64) -> Result<(), CoreError> {
        self.write_line(&format_turn(turn))
    }

    /// Record one piece's state
    pub fn piece(&mut self, record: &PieceRecord<'_>) -> Result<(), CoreError> {
        self.write_line(&format_piece(record))
    }

    pub fn flush(&mut self) -> Result<(), CoreError> {
        self.writer.flush().map_err(|source| CoreError::GameLog {
            path: self.path.clone(),
            source,
        })
    }

    fn write_line(&mut self, line: &str) -> Result<(), CoreError> {
        tracing::debug!("Writing {:?} on {}", line.trim_end(), self.path.display());
        self.writer
            .write_all(line.as_bytes())
            .map_err(|source| CoreError::GameLog {
                path: self.path.clone(),
                source,
            })
    }
}

impl Drop for GameLogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("Failed to flush game log {}: {}", self.path.display(), e);
        }
    }
}

/// Host callback `a-fichero-tiempo`: append a turn marker to `path`
pub fn file_new_turn(path: &Path, turn: i64) -> Result<(), CoreError> {
    append_once(path, &format_turn(turn))
}

/// Host callback `a-fichero-jugador`: append a piece line to `path`
pub fn file_new_piece(
    path: &Path,
    team: &str,
    nid: &str,
    value: &str,
    x: &str,
    y: &str,
    covered: &str,
) -> Result<(), CoreError> {
    append_once(path, &format_piece_tokens(team, nid, value, x, y, covered))
}

fn append_once(path: &Path, line: &str) -> Result<(), CoreError> {
    let to_error = |source| CoreError::GameLog {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;
    file.write_all(line.as_bytes()).map_err(to_error)?;
    tracing::debug!("Wrote {:?} on {}", line.trim_end(), path.display());
    Ok(())
}
