//! Resistencia Core - rule library and game adjudication
//!
//! This crate provides the rules every match is judged by:
//! - Rule function library (distances, move codes, visibility, turn order)
//! - Frozen name → function registry consulted by agents
//! - Square board geometry and team definitions
//! - Hidden-movement game loop and rule-based agents
//! - Append-only game log

pub mod agent;
pub mod board;
pub mod error;
pub mod game;
pub mod game_log;
pub mod registry;
pub mod rules;
pub mod team;

// Re-exports for convenient access
pub use agent::{AgentView, RuleAgent};
pub use board::{Direction, Side, Square, DEFAULT_BOARD_SIZE, DIRECTIONS};
pub use error::CoreError;
pub use game::{play_game, EndReason, GameConfig, GameOutcome, GameResult, GameState, SideReport};
pub use game_log::{GameLogWriter, PieceRecord};
pub use registry::{RuleError, RuleFunction, RuleRegistry, RuleRegistryBuilder, RuleValue};
pub use team::{PieceSpec, Strategy, Team, TeamDefinition};
