//! Game state, adjudication and the turn loop
//!
//! Two teams face each other on a square board. Team A keeps the
//! coordinates of its definition; team B's formation is reflected through
//! the board centre so both sides start on their own back rows. Pieces are
//! hidden until they fight: an attack discloses both pieces, the higher
//! value survives and equal values remove each other.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentView, Candidate, EnemyPiece, OwnPiece, RuleAgent};
use crate::board::{Direction, Side, Square, DEFAULT_BOARD_SIZE, DIRECTIONS};
use crate::error::CoreError;
use crate::game_log::{GameLogWriter, PieceRecord};
use crate::registry::{RuleError, RuleRegistry};
use crate::rules;
use crate::team::TeamDefinition;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Turns before a game is declared drawn
pub const DEFAULT_MAX_TURNS: u32 = 100;

/// Seed for random agents when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Offset passed to `turno`: team A moves on odd turns
const TEAM_A_START: i64 = 0;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Parameters of a single game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: i64,
    pub max_turns: u32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            max_turns: DEFAULT_MAX_TURNS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    AWins,
    BWins,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::AWins => Some(Side::A),
            GameResult::BWins => Some(Side::B),
            _ => None,
        }
    }

    fn won_by(side: Side) -> Self {
        match side {
            Side::A => GameResult::AWins,
            Side::B => GameResult::BWins,
        }
    }
}

/// Why a game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A side lost its last piece
    Annihilation,
    /// The side to move had no legal move
    NoLegalMove,
    /// `max_turns` reached
    TurnLimit,
}

/// A piece on the board
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub side: Side,
    pub id: String,
    pub value: i64,
    pub square: Square,
    pub disclosed: bool,
}

/// A piece removed in combat
#[derive(Clone, Debug, PartialEq, Eq)]
struct Death {
    side: Side,
    value: i64,
    turn: u32,
}

/// What a side has left at the end of a game
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideReport {
    /// Surviving pieces
    pub pieces: u32,
    /// Sum of surviving piece values
    pub value: i64,
    /// Turn in which the side's highest-value piece died
    pub max_value_death: Option<u32>,
}

/// Outcome of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub result: GameResult,
    pub reason: EndReason,
    pub turns: u32,
    /// Indexed by `Side::index()`
    pub sides: [SideReport; 2],
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Side> {
        self.result.winner()
    }

    pub fn report(&self, side: Side) -> &SideReport {
        &self.sides[side.index()]
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Full game state (both sides, absolute coordinates)
#[derive(Clone, Debug)]
pub struct GameState {
    board_size: i64,
    /// Last completed turn (0 before the first move)
    turn: u32,
    pieces: Vec<Piece>,
    deaths: Vec<Death>,
    top_values: [i64; 2],
    result: GameResult,
    reason: Option<EndReason>,
}

impl GameState {
    /// Place both formations; `home` plays side A
    pub fn new(board_size: i64, home: &TeamDefinition, away: &TeamDefinition) -> Self {
        let place = |def: &TeamDefinition, side: Side| {
            def.pieces
                .iter()
                .map(|spec| Piece {
                    side,
                    id: spec.id.clone(),
                    value: spec.value,
                    square: match side {
                        Side::A => spec.square(),
                        Side::B => spec.square().mirrored(board_size),
                    },
                    disclosed: false,
                })
                .collect::<Vec<_>>()
        };

        let mut pieces = place(home, Side::A);
        pieces.extend(place(away, Side::B));

        let top = |def: &TeamDefinition| def.pieces.iter().map(|p| p.value).max().unwrap_or(0);

        Self {
            board_size,
            turn: 0,
            pieces,
            deaths: Vec::new(),
            top_values: [top(home), top(away)],
            result: GameResult::Ongoing,
            reason: None,
        }
    }

    pub fn board_size(&self) -> i64 {
        self.board_size
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |p| p.side == side)
    }

    pub fn piece_at(&self, square: Square) -> Option<usize> {
        self.pieces.iter().position(|p| p.square == square)
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    /// Owner of the next turn, as the rule layer decides it
    pub fn side_to_move(&self, registry: &RuleRegistry) -> Result<Side, RuleError> {
        let owner = registry.call("turno", &[(self.turn as i64 + 1).into(), TEAM_A_START.into()])?;
        owner
            .as_str()
            .and_then(Side::parse)
            .ok_or_else(|| RuleError::ArgumentType {
                name: "turno".to_string(),
                position: 0,
                expected: "a side token",
                got: "unknown token",
            })
    }

    /// Legal moves for `side`, as (piece index, absolute direction)
    pub fn legal_moves(
        &self,
        side: Side,
        registry: &RuleRegistry,
    ) -> Result<Vec<(usize, Direction)>, RuleError> {
        let mut moves = Vec::new();
        for (index, piece) in self.pieces.iter().enumerate() {
            if piece.side != side {
                continue;
            }
            for direction in DIRECTIONS {
                let valid = registry.call_bool(
                    "mov-valido",
                    &[
                        self.board_size.into(),
                        direction.code().into(),
                        piece.square.x.into(),
                        piece.square.y.into(),
                    ],
                )?;
                if !valid {
                    continue;
                }
                let target = piece.square.step(direction);
                let blocked = self
                    .piece_at(target)
                    .map_or(false, |other| self.pieces[other].side == side);
                if !blocked {
                    moves.push((index, direction));
                }
            }
        }
        Ok(moves)
    }

    /// The board as `side` sees it, in its own orientation
    pub fn view_for(&self, side: Side, registry: &RuleRegistry) -> Result<AgentView, RuleError> {
        let orient = |square: Square| match side {
            Side::A => square,
            Side::B => square.mirrored(self.board_size),
        };

        let mut own = Vec::new();
        let mut own_slot = vec![usize::MAX; self.pieces.len()];
        let mut enemies = Vec::new();
        for (index, piece) in self.pieces.iter().enumerate() {
            if piece.side == side {
                own_slot[index] = own.len();
                own.push(OwnPiece {
                    square: orient(piece.square),
                    value: piece.value,
                });
            } else {
                enemies.push(EnemyPiece {
                    square: orient(piece.square),
                    value: piece.disclosed.then_some(piece.value),
                });
            }
        }

        let candidates = self
            .legal_moves(side, registry)?
            .into_iter()
            .map(|(index, direction)| Candidate {
                piece: own_slot[index],
                direction: match side {
                    Side::A => direction,
                    Side::B => direction.mirrored(),
                },
            })
            .collect();

        Ok(AgentView {
            board_size: self.board_size,
            own,
            enemies,
            candidates,
        })
    }

    /// Apply a move and resolve any combat. Advances the turn counter.
    pub fn apply_move(&mut self, piece: usize, direction: Direction) {
        self.turn += 1;
        let target = self.pieces[piece].square.step(direction);

        let Some(defender) = self.piece_at(target) else {
            self.pieces[piece].square = target;
            return;
        };

        self.pieces[piece].disclosed = true;
        self.pieces[defender].disclosed = true;
        let attack = self.pieces[piece].value;
        let defence = self.pieces[defender].value;

        let mut removed = Vec::with_capacity(2);
        if attack > defence {
            self.pieces[piece].square = target;
            removed.push(defender);
        } else if attack < defence {
            removed.push(piece);
        } else {
            removed.push(piece);
            removed.push(defender);
        }

        removed.sort_unstable_by(|a, b| b.cmp(a));
        for index in removed {
            let dead = self.pieces.remove(index);
            self.deaths.push(Death {
                side: dead.side,
                value: dead.value,
                turn: self.turn,
            });
        }

        self.check_annihilation();
    }

    /// End the game because `side` cannot move
    pub fn forfeit(&mut self, side: Side) {
        self.result = GameResult::won_by(side.opponent());
        self.reason = Some(EndReason::NoLegalMove);
    }

    /// Declare a draw on the turn limit
    pub fn expire(&mut self) {
        self.result = GameResult::Draw;
        self.reason = Some(EndReason::TurnLimit);
    }

    fn check_annihilation(&mut self) {
        let a_alive = self.pieces_of(Side::A).next().is_some();
        let b_alive = self.pieces_of(Side::B).next().is_some();
        let result = match (a_alive, b_alive) {
            (true, true) => return,
            (true, false) => GameResult::AWins,
            (false, true) => GameResult::BWins,
            (false, false) => GameResult::Draw,
        };
        self.result = result;
        self.reason = Some(EndReason::Annihilation);
    }

    fn side_report(&self, side: Side) -> SideReport {
        let top = self.top_values[side.index()];
        SideReport {
            pieces: self.pieces_of(side).count() as u32,
            value: self.pieces_of(side).map(|p| p.value).sum(),
            max_value_death: self
                .deaths
                .iter()
                .find(|d| d.side == side && d.value == top)
                .map(|d| d.turn),
        }
    }

    /// Final outcome; `None` while the game is still running
    pub fn outcome(&self) -> Option<GameOutcome> {
        let reason = self.reason?;
        Some(GameOutcome {
            result: self.result,
            reason,
            turns: self.turn,
            sides: [self.side_report(Side::A), self.side_report(Side::B)],
        })
    }

    /// Text board from `perspective`: own values, enemy values when
    /// disclosed and the hidden symbol otherwise
    pub fn render(&self, perspective: Side) -> String {
        let mut out = String::new();
        for y in (1..=self.board_size).rev() {
            for x in 1..=self.board_size {
                let cell = match self.piece_at(Square::new(x, y)) {
                    None => ".".to_string(),
                    Some(i) => {
                        let piece = &self.pieces[i];
                        if piece.side == perspective || piece.disclosed {
                            piece.value.to_string()
                        } else {
                            rules::piece_symbol(0).to_string()
                        }
                    }
                };
                out.push_str(&cell);
            }
            out.push('\n');
        }
        out
    }

    fn log_pieces(&self, log: &mut GameLogWriter) -> Result<(), CoreError> {
        for piece in &self.pieces {
            log.piece(&PieceRecord {
                team: piece.side,
                id: &piece.id,
                value: piece.value,
                x: piece.square.x,
                y: piece.square.y,
                covered: !piece.disclosed,
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// TURN LOOP
// ============================================================================

/// Play a full game between `home` (side A) and `away` (side B).
///
/// When a log writer is given, every turn appends its marker followed by
/// one disclosure line per piece still on the board.
pub fn play_game(
    home: &TeamDefinition,
    away: &TeamDefinition,
    config: &GameConfig,
    registry: &RuleRegistry,
    mut log: Option<&mut GameLogWriter>,
) -> Result<GameOutcome, CoreError> {
    let mut state = GameState::new(config.board_size, home, away);
    let seed = config.seed.unwrap_or(DEFAULT_SEED);
    let mut agents = [
        RuleAgent::new(Side::A, home.strategy, seed),
        RuleAgent::new(Side::B, away.strategy, seed.wrapping_add(1)),
    ];

    let outcome = loop {
        if let Some(outcome) = state.outcome() {
            break outcome;
        }
        if state.turn() >= config.max_turns {
            state.expire();
            continue;
        }

        let side = state.side_to_move(registry)?;
        if let Some(log) = log.as_deref_mut() {
            log.new_turn(state.turn() as i64 + 1)?;
        }

        let view = state.view_for(side, registry)?;
        match agents[side.index()].choose(&view, registry)? {
            None => state.forfeit(side),
            Some(choice) => {
                let (piece, direction) = state.legal_moves(side, registry)?[choice];
                state.apply_move(piece, direction);
            }
        }

        if let Some(log) = log.as_deref_mut() {
            state.log_pieces(log)?;
        }
        tracing::trace!("turn {}:\n{}", state.turn(), state.render(Side::A));
    };

    if let Some(log) = log {
        log.flush()?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{PieceSpec, Strategy};

    fn team(pieces: &[(&str, i64, i64, i64)], strategy: Strategy) -> TeamDefinition {
        TeamDefinition {
            name: None,
            strategy,
            pieces: pieces
                .iter()
                .map(|&(id, value, x, y)| PieceSpec { id: id.to_string(), value, x, y })
                .collect(),
        }
    }

    #[test]
    fn test_initial_placement_mirrors_away_team() {
        let home = team(&[("1", 5, 1, 1)], Strategy::Aggressive);
        let away = team(&[("1", 5, 1, 1)], Strategy::Aggressive);
        let state = GameState::new(8, &home, &away);

        assert_eq!(state.pieces()[0].square, Square::new(1, 1));
        assert_eq!(state.pieces()[1].square, Square::new(8, 8));
        assert_eq!(state.pieces()[1].side, Side::B);
    }

    #[test]
    fn test_turn_order_starts_with_a() {
        let registry = RuleRegistry::standard();
        let home = team(&[("1", 5, 1, 1)], Strategy::Aggressive);
        let mut state = GameState::new(8, &home, &home);

        assert_eq!(state.side_to_move(&registry).unwrap(), Side::A);
        state.apply_move(0, Direction::Up);
        assert_eq!(state.side_to_move(&registry).unwrap(), Side::B);
    }

    #[test]
    fn test_legal_moves_respect_edges_and_own_pieces() {
        let registry = RuleRegistry::standard();
        let home = team(&[("1", 5, 1, 1), ("2", 3, 2, 1)], Strategy::Aggressive);
        let state = GameState::new(8, &home, &home);

        let moves: Vec<_> = state
            .legal_moves(Side::A, &registry)
            .unwrap()
            .into_iter()
            .filter(|(i, _)| *i == 0)
            .map(|(_, d)| d)
            .collect();
        // (1,1): left and down fall off the board, right is blocked by piece 2
        assert_eq!(moves, vec![Direction::Up]);
    }

    #[test]
    fn test_combat_outcomes() {
        let home = team(&[("s", 6, 4, 4)], Strategy::Aggressive);
        let away = team(&[("w", 2, 4, 4)], Strategy::Aggressive);
        // away (4,4) mirrors to (5,5); put home next to it
        let mut state = GameState::new(8, &home, &away);
        state.pieces[0].square = Square::new(5, 4);

        state.apply_move(0, Direction::Up);
        assert_eq!(state.result(), GameResult::AWins);
        let outcome = state.outcome().unwrap();
        assert_eq!(outcome.reason, EndReason::Annihilation);
        assert_eq!(outcome.report(Side::A).pieces, 1);
        assert_eq!(outcome.report(Side::B).max_value_death, Some(1));
        assert!(state.pieces()[0].disclosed);
        assert_eq!(state.pieces()[0].square, Square::new(5, 5));
    }

    #[test]
    fn test_equal_values_trade() {
        let home = team(&[("a", 4, 4, 4), ("b", 1, 1, 1)], Strategy::Aggressive);
        let away = team(&[("c", 4, 4, 4), ("d", 1, 1, 1)], Strategy::Aggressive);
        let mut state = GameState::new(8, &home, &away);
        state.pieces[0].square = Square::new(5, 4);

        state.apply_move(0, Direction::Up);
        assert_eq!(state.pieces().len(), 2);
        assert_eq!(state.result(), GameResult::Ongoing);
    }

    #[test]
    fn test_view_for_b_is_mirrored() {
        let registry = RuleRegistry::standard();
        let home = team(&[("1", 5, 3, 1)], Strategy::Aggressive);
        let away = team(&[("1", 7, 2, 1)], Strategy::Aggressive);
        let state = GameState::new(8, &home, &away);

        let view = state.view_for(Side::B, &registry).unwrap();
        assert_eq!(view.own[0].square, Square::new(2, 1));
        assert_eq!(view.enemies[0].square, Square::new(6, 8));
        assert_eq!(view.enemies[0].value, None);
        assert!(view
            .candidates
            .iter()
            .any(|c| c.direction == Direction::Up));
        assert!(!view
            .candidates
            .iter()
            .any(|c| c.direction == Direction::Down));
    }

    #[test]
    fn test_play_game_is_deterministic_and_finishes() {
        let registry = RuleRegistry::standard();
        let home = TeamDefinition::line_formation(8, &[1, 2, 3, 4, 5, 6, 7, 8], Strategy::Aggressive);
        let away = TeamDefinition::line_formation(8, &[8, 7, 6, 5, 4, 3, 2, 1], Strategy::Cautious);
        let config = GameConfig::default().with_max_turns(60);

        let first = play_game(&home, &away, &config, &registry, None).unwrap();
        let second = play_game(&home, &away, &config, &registry, None).unwrap();
        assert_eq!(first, second);
        assert!(first.turns <= 60);
        if first.reason == EndReason::TurnLimit {
            assert_eq!(first.result, GameResult::Draw);
        }
    }

    #[test]
    fn test_play_game_writes_turn_log() {
        let registry = RuleRegistry::standard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.txt");
        let home = team(&[("1", 5, 1, 1)], Strategy::Aggressive);
        let away = team(&[("1", 5, 1, 1)], Strategy::Cautious);
        let config = GameConfig::default().with_max_turns(3);

        {
            let mut log = GameLogWriter::append(&path).unwrap();
            play_game(&home, &away, &config, &registry, Some(&mut log)).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "tiempo 1");
        assert!(lines[1].starts_with("e:A n:1 p:5 "));
        assert!(lines[2].starts_with("e:B n:1 p:5 "));
        assert!(lines[2].ends_with("d:1"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("tiempo")).count(), 3);
    }

    #[test]
    fn test_render_hides_undisclosed_enemies() {
        let home = team(&[("1", 5, 1, 1)], Strategy::Aggressive);
        let away = team(&[("1", 7, 1, 1)], Strategy::Aggressive);
        let state = GameState::new(2, &home, &away);
        assert_eq!(state.render(Side::A), ".?\n5.\n");
        assert_eq!(state.render(Side::B), ".7\n?.\n");
    }
}
