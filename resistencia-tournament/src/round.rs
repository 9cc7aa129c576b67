//! Round - one batch of independent matches
//!
//! Level 2 - Phase-level implementation

use std::io::Write;
use std::path::{Path, PathBuf};

use resistencia_core::{EndReason, GameOutcome, Side};
use serde::Serialize;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::error::LeagueError;
use crate::match_play::MatchRunner;
use crate::pairing::{is_ghost, Pairing};
use crate::scores::ScoreTable;
use crate::translation::TranslationTable;

/// How a scheduled pairing was resolved
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MatchKind {
    Played(GameOutcome),
    /// Paired against the ghost; `team` is the real team
    Bye { team: String },
}

/// A resolved pairing
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchRecord {
    pub home: String,
    pub away: String,
    pub kind: MatchKind,
}

impl MatchRecord {
    /// Name of the winning team, `None` for draws and byes
    pub fn winner(&self) -> Option<&str> {
        match &self.kind {
            MatchKind::Played(outcome) => outcome.winner().map(|side| match side {
                Side::A => self.home.as_str(),
                Side::B => self.away.as_str(),
            }),
            MatchKind::Bye { .. } => None,
        }
    }

    /// Points for (home, away)
    fn points(&self, scoring: &ScoringConfig) -> (u32, u32) {
        match &self.kind {
            MatchKind::Played(outcome) => match outcome.winner() {
                Some(Side::A) => (scoring.win, scoring.loss),
                Some(Side::B) => (scoring.loss, scoring.win),
                None => (scoring.draw, scoring.draw),
            },
            MatchKind::Bye { team } if *team == self.home => (scoring.bye, 0),
            MatchKind::Bye { .. } => (0, scoring.bye),
        }
    }

    /// Tournament log line; `detailed` adds turn count and end reason
    pub fn log_line(&self, detailed: bool) -> String {
        match &self.kind {
            MatchKind::Bye { team } => format!("{} descansa", team),
            MatchKind::Played(outcome) => {
                let verdict = match self.winner() {
                    Some(winner) => format!("gana {}", winner),
                    None => "empate".to_string(),
                };
                if detailed {
                    format!(
                        "{} - {}: {} ({} turnos, {})",
                        self.home,
                        self.away,
                        verdict,
                        outcome.turns,
                        reason_label(outcome.reason)
                    )
                } else {
                    format!("{} - {}: {}", self.home, self.away, verdict)
                }
            }
        }
    }
}

fn reason_label(reason: EndReason) -> &'static str {
    match reason {
        EndReason::Annihilation => "sin piezas",
        EndReason::NoLegalMove => "sin movimientos",
        EndReason::TurnLimit => "limite de turnos",
    }
}

/// File name of a match's game log inside the games directory
pub fn game_log_name(home: &str, away: &str, round: usize) -> String {
    format!("{}_vs_{}_ronda{}.txt", home, away, round)
}

/// Matches of one round and the points they produced
#[derive(Clone, Debug)]
pub struct Round {
    number: usize,
    pairings: Vec<Pairing>,
    records: Vec<Option<MatchRecord>>,
    scores: ScoreTable,
    keys: Vec<String>,
    scoring: ScoringConfig,
}

impl Round {
    /// `number` is 1-based; `keys` must cover every team in `pairings`
    pub fn new(number: usize, pairings: Vec<Pairing>, keys: &[String], scoring: ScoringConfig) -> Self {
        Self {
            number,
            records: vec![None; pairings.len()],
            pairings,
            scores: ScoreTable::new(keys.iter().cloned()),
            keys: keys.to_vec(),
            scoring,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn get_number_of_games(&self) -> usize {
        self.pairings.len()
    }

    /// Play pairing `index` and add its points to this round's table.
    ///
    /// A pairing against the ghost is recorded as a bye without consulting
    /// the runner. Points are added only once the match has finished.
    pub fn play_match<R: MatchRunner>(
        &mut self,
        index: usize,
        runner: &mut R,
        teams: &TranslationTable,
        games_dir: Option<&Path>,
    ) -> Result<&MatchRecord, LeagueError> {
        let (home, away) = self
            .pairings
            .get(index)
            .cloned()
            .ok_or(LeagueError::MatchIndexOutOfRange {
                round: self.number,
                index,
            })?;
        if self.records[index].is_some() {
            return Err(LeagueError::MatchAlreadyPlayed {
                round: self.number,
                index,
            });
        }
        for key in [&home, &away] {
            if self.scores.get(key).is_none() {
                return Err(LeagueError::UnknownTeam(key.clone()));
            }
        }

        let kind = if is_ghost(&away) {
            MatchKind::Bye { team: home.clone() }
        } else if is_ghost(&home) {
            MatchKind::Bye { team: away.clone() }
        } else {
            let home_team = teams
                .get(&home)
                .ok_or_else(|| LeagueError::UnknownTeam(home.clone()))?;
            let away_team = teams
                .get(&away)
                .ok_or_else(|| LeagueError::UnknownTeam(away.clone()))?;
            let game_log: Option<PathBuf> =
                games_dir.map(|dir| dir.join(game_log_name(&home, &away, self.number)));

            let outcome = runner
                .play(home_team, away_team, game_log.as_deref())
                .map_err(|source| LeagueError::Match {
                    home: home.clone(),
                    away: away.clone(),
                    source,
                })?;
            MatchKind::Played(outcome)
        };

        let record = MatchRecord { home, away, kind };
        let (home_points, away_points) = record.points(&self.scoring);
        self.scores.add(&record.home, home_points)?;
        self.scores.add(&record.away, away_points)?;
        debug!(round = self.number, index, "{}", record.log_line(true));

        Ok(&*self.records[index].insert(record))
    }

    /// Resolved matches in pairing order
    pub fn records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.records.iter().all(Option::is_some)
    }

    /// Snapshot of this round's points
    pub fn get_puntuation(&self) -> ScoreTable {
        self.scores.clone()
    }

    pub fn log_lines(&self, detailed: bool) -> Vec<String> {
        self.records().map(|r| r.log_line(detailed)).collect()
    }

    /// Write one line per resolved match
    pub fn log_tournament<W: Write>(&self, writer: &mut W, detailed: bool) -> std::io::Result<()> {
        for line in self.log_lines(detailed) {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// Game log files this round's played pairings write inside `dir`
    pub fn game_log_paths(&self, dir: &Path) -> Vec<PathBuf> {
        self.pairings
            .iter()
            .filter(|(home, away)| !is_ghost(home) && !is_ghost(away))
            .map(|(home, away)| dir.join(game_log_name(home, away, self.number)))
            .collect()
    }

    /// Forget every result so the round can be replayed
    pub fn reset(&mut self) {
        self.records.iter_mut().for_each(|r| *r = None);
        self.scores = ScoreTable::new(self.keys.iter().cloned());
    }
}
