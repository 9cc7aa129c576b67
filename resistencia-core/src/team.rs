//! Team definitions - formation and strategy of a rule agent
//!
//! A team is identified by the path of its definition file; the short name
//! used everywhere else (score keys, logs) is the file stem.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::board::Square;
use crate::error::CoreError;
use crate::rules::MAX_PIECE_VALUE;

/// How a rule agent weighs its candidate moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Close in on the nearest enemy, attack hidden pieces with strong pieces
    #[default]
    Aggressive,
    /// Only strong pieces advance; weak ones keep their distance
    Cautious,
    /// Uniform choice among legal moves
    Random,
}

/// A piece in the team's own orientation (own half is the low rows)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub id: String,
    pub value: i64,
    pub x: i64,
    pub y: i64,
}

impl PieceSpec {
    pub fn square(&self) -> Square {
        Square::new(self.x, self.y)
    }
}

/// Contents of a team definition file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamDefinition {
    /// Display name (informational; the file stem is the team key)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub strategy: Strategy,
    pub pieces: Vec<PieceSpec>,
}

impl TeamDefinition {
    /// Pieces with the given values laid out left to right on row 1, then row 2, ...
    ///
    /// A board without squares (`board_size <= 0`) places no pieces.
    pub fn line_formation(board_size: i64, values: &[i64], strategy: Strategy) -> Self {
        let placed: &[i64] = if board_size > 0 { values } else { &[] };
        let pieces = placed
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let i = i as i64;
                PieceSpec {
                    id: (i + 1).to_string(),
                    value,
                    x: i % board_size + 1,
                    y: i / board_size + 1,
                }
            })
            .collect();

        Self {
            name: None,
            strategy,
            pieces,
        }
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::TeamRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| CoreError::TeamParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| CoreError::TeamParse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| CoreError::TeamRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the formation fits a board of the given dimension.
    ///
    /// `path` is only used to label the error.
    pub fn validate(&self, board_size: i64, path: &Path) -> Result<(), CoreError> {
        let malformed = |reason: String| CoreError::MalformedTeam {
            path: path.to_path_buf(),
            reason,
        };

        if self.pieces.is_empty() {
            return Err(malformed("team has no pieces".to_string()));
        }

        let own_rows = board_size / 2;
        let mut ids = HashSet::new();
        let mut squares = HashSet::new();

        for piece in &self.pieces {
            if !ids.insert(piece.id.as_str()) {
                return Err(malformed(format!("duplicate piece id {:?}", piece.id)));
            }
            if !(0..=MAX_PIECE_VALUE).contains(&piece.value) {
                return Err(malformed(format!(
                    "piece {:?} has value {} outside 0..={}",
                    piece.id, piece.value, MAX_PIECE_VALUE
                )));
            }
            let square = piece.square();
            if !square.is_on_board(board_size) || square.y > own_rows {
                return Err(malformed(format!(
                    "piece {:?} at {} is outside the team's half",
                    piece.id, square
                )));
            }
            if !squares.insert(square) {
                return Err(malformed(format!("two pieces share square {}", square)));
            }
        }

        Ok(())
    }
}

/// A tournament participant: the definition path and its derived short name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Team {
    pub name: String,
    pub path: PathBuf,
}

impl Team {
    /// Derive the short name from the file stem
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let name = team_name_from_path(&path).ok_or_else(|| CoreError::MalformedTeam {
            path: path.clone(),
            reason: "cannot derive a team name from the path".to_string(),
        })?;

        Ok(Self { name, path })
    }

    pub fn load_definition(&self) -> Result<TeamDefinition, CoreError> {
        TeamDefinition::load(&self.path)
    }
}

/// Short team name for a definition path (`teams/iron_wolf.json` → `iron_wolf`)
pub fn team_name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
