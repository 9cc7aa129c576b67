//! Rule agent - move selection through the rule registry
//!
//! The agent always reasons in its own orientation (its pieces start on the
//! low rows and `Up` advances towards the enemy). Every geometric question
//! is put to the registry by name, the way an external rule layer would.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::{Direction, Side, Square};
use crate::registry::{RuleError, RuleRegistry, RuleValue};
use crate::team::Strategy;

/// Score of capturing a disclosed weaker piece (plus its value)
const CAPTURE_SCORE: f64 = 100.0;
/// Score of walking into a disclosed stronger piece
const LOSING_ATTACK_SCORE: f64 = -100.0;
/// Bonus for ending a move inside the enemy half
const ENEMY_HALF_BONUS: f64 = 2.0;

/// One of the agent's own pieces, as it sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnPiece {
    pub square: Square,
    pub value: i64,
}

/// An enemy piece; its value is known only once disclosed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyPiece {
    pub square: Square,
    pub value: Option<i64>,
}

/// A legal move: index into `AgentView::own` plus a direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub piece: usize,
    pub direction: Direction,
}

/// Everything an agent may know on its turn, in its own orientation
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    pub board_size: i64,
    pub own: Vec<OwnPiece>,
    pub enemies: Vec<EnemyPiece>,
    pub candidates: Vec<Candidate>,
}

impl AgentView {
    fn enemy_at(&self, square: Square) -> Option<&EnemyPiece> {
        self.enemies.iter().find(|e| e.square == square)
    }
}

/// Deterministic rule-based player
pub struct RuleAgent {
    side: Side,
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl RuleAgent {
    pub fn new(side: Side, strategy: Strategy, seed: u64) -> Self {
        Self {
            side,
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Pick a candidate; `None` only when there is none.
    ///
    /// Ties keep the earliest candidate, so the result only depends on the
    /// view (and the seed, for random agents).
    pub fn choose(
        &mut self,
        view: &AgentView,
        registry: &RuleRegistry,
    ) -> Result<Option<usize>, RuleError> {
        if view.candidates.is_empty() {
            return Ok(None);
        }

        if self.strategy == Strategy::Random {
            return Ok(Some(self.rng.gen_range(0..view.candidates.len())));
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in view.candidates.iter().enumerate() {
            let score = self.score(view, candidate, registry)?;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        Ok(best.map(|(i, _)| i))
    }

    fn score(
        &self,
        view: &AgentView,
        candidate: &Candidate,
        registry: &RuleRegistry,
    ) -> Result<f64, RuleError> {
        let piece = view.own[candidate.piece];
        let code = RuleValue::Int(candidate.direction.code());
        let target = Square::new(
            piece.square.x + registry.call_i64("mov-x", &[code.clone()])?,
            piece.square.y + registry.call_i64("mov-y", &[code])?,
        );
        let strong = piece.value > registry.call_i64("sim", &[piece.value.into()])?;

        if let Some(enemy) = view.enemy_at(target) {
            let score = match enemy.value {
                Some(v) if piece.value > v => CAPTURE_SCORE + v as f64,
                Some(v) if piece.value == v => match self.strategy {
                    Strategy::Aggressive => 10.0,
                    _ => -50.0,
                },
                Some(_) => LOSING_ATTACK_SCORE,
                None => match (self.strategy, strong) {
                    (Strategy::Aggressive, true) => 50.0,
                    (Strategy::Aggressive, false) => 5.0,
                    (_, true) => 20.0,
                    (_, false) => -30.0,
                },
            };
            return Ok(score);
        }

        let before = nearest_enemy(view, piece.square, registry)?;
        let after = nearest_enemy(view, target, registry)?;
        let approach = before - after;

        let mut score = match (self.strategy, strong) {
            (Strategy::Cautious, false) => -approach * 5.0,
            _ => approach * 10.0,
        };

        let d = view.board_size;
        let in_enemy_half = registry.call_bool(
            "dentro",
            &[
                1.into(),
                (d / 2 + 1).into(),
                d.into(),
                d.into(),
                target.x.into(),
                target.y.into(),
            ],
        )?;
        if in_enemy_half {
            score += ENEMY_HALF_BONUS;
        }

        Ok(score)
    }
}

/// Distance from `from` to the closest enemy (0 when there are none)
fn nearest_enemy(view: &AgentView, from: Square, registry: &RuleRegistry) -> Result<f64, RuleError> {
    let mut nearest: Option<RuleValue> = None;
    for enemy in &view.enemies {
        let d = registry.call(
            "distancia",
            &[
                from.x.into(),
                from.y.into(),
                enemy.square.x.into(),
                enemy.square.y.into(),
            ],
        )?;
        nearest = Some(match nearest {
            None => d,
            Some(current) => registry.call("minimo", &[current, d])?,
        });
    }

    Ok(nearest.and_then(|v| v.as_f64()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(own: Vec<OwnPiece>, enemies: Vec<EnemyPiece>, candidates: Vec<Candidate>) -> AgentView {
        AgentView {
            board_size: 8,
            own,
            enemies,
            candidates,
        }
    }

    #[test]
    fn test_no_candidates() {
        let registry = RuleRegistry::standard();
        let mut agent = RuleAgent::new(Side::A, Strategy::Aggressive, 1);
        assert_eq!(agent.choose(&AgentView::default(), &registry).unwrap(), None);
    }

    #[test]
    fn test_captures_disclosed_weaker_piece() {
        let registry = RuleRegistry::standard();
        let mut agent = RuleAgent::new(Side::A, Strategy::Cautious, 1);
        let v = view(
            vec![OwnPiece { square: Square::new(4, 4), value: 5 }],
            vec![EnemyPiece { square: Square::new(5, 4), value: Some(2) }],
            vec![
                Candidate { piece: 0, direction: Direction::Up },
                Candidate { piece: 0, direction: Direction::Right },
            ],
        );
        assert_eq!(agent.choose(&v, &registry).unwrap(), Some(1));
    }

    #[test]
    fn test_avoids_disclosed_stronger_piece() {
        let registry = RuleRegistry::standard();
        let mut agent = RuleAgent::new(Side::A, Strategy::Aggressive, 1);
        let v = view(
            vec![OwnPiece { square: Square::new(4, 4), value: 2 }],
            vec![EnemyPiece { square: Square::new(4, 5), value: Some(7) }],
            vec![
                Candidate { piece: 0, direction: Direction::Up },
                Candidate { piece: 0, direction: Direction::Left },
            ],
        );
        assert_eq!(agent.choose(&v, &registry).unwrap(), Some(1));
    }

    #[test]
    fn test_aggressive_approaches_cautious_weak_retreats() {
        let registry = RuleRegistry::standard();
        let enemies = vec![EnemyPiece { square: Square::new(4, 8), value: None }];
        let candidates = vec![
            Candidate { piece: 0, direction: Direction::Down },
            Candidate { piece: 0, direction: Direction::Up },
        ];
        let own = vec![OwnPiece { square: Square::new(4, 2), value: 1 }];

        let mut aggressive = RuleAgent::new(Side::A, Strategy::Aggressive, 1);
        let v = view(own.clone(), enemies.clone(), candidates.clone());
        assert_eq!(aggressive.choose(&v, &registry).unwrap(), Some(1));

        let mut cautious = RuleAgent::new(Side::A, Strategy::Cautious, 1);
        assert_eq!(cautious.choose(&v, &registry).unwrap(), Some(0));
    }

    #[test]
    fn test_random_agent_is_seeded() {
        let registry = RuleRegistry::standard();
        let candidates: Vec<Candidate> = crate::board::DIRECTIONS
            .iter()
            .map(|&direction| Candidate { piece: 0, direction })
            .collect();
        let v = view(
            vec![OwnPiece { square: Square::new(4, 4), value: 3 }],
            vec![EnemyPiece { square: Square::new(1, 8), value: None }],
            candidates,
        );

        let picks = |seed| {
            let mut agent = RuleAgent::new(Side::B, Strategy::Random, seed);
            (0..10)
                .map(|_| agent.choose(&v, &registry).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
        assert!(picks(7).iter().all(|p| p.map_or(false, |i| i < 4)));
    }

    #[test]
    fn test_nearest_enemy() {
        let registry = RuleRegistry::standard();
        let v = view(
            vec![],
            vec![
                EnemyPiece { square: Square::new(1, 5), value: None },
                EnemyPiece { square: Square::new(4, 7), value: None },
            ],
            vec![],
        );
        assert_eq!(nearest_enemy(&v, Square::new(4, 4), &registry).unwrap(), 3.0);
        assert_eq!(nearest_enemy(&AgentView::default(), Square::new(4, 4), &registry).unwrap(), 0.0);
    }
}
