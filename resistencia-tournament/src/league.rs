//! League - round-robin tournament state machine
//!
//! Level 1 - Orchestration
//!
//! A league moves from not started (`actual_round == 0`) through in
//! progress to completed (`actual_round == number_of_rounds`). Only
//! `play_round*` advances it, by exactly one round per successful call.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::LeagueConfig;
use crate::error::LeagueError;
use crate::match_play::MatchRunner;
use crate::pairing::{make_pairings, GHOST_TEAM};
use crate::round::{MatchRecord, Round};
use crate::scores::ScoreTable;
use crate::tournament_log::TournamentLog;
use crate::translation::TranslationTable;

/// Reported to the progress callback after every match
#[derive(Clone, Copy, Debug)]
pub struct MatchProgress<'a> {
    /// 1-based round number
    pub round: usize,
    /// Index of the match just finished
    pub index: usize,
    /// Matches in the round
    pub total: usize,
    pub record: &'a MatchRecord,
}

/// Result of a committed round
#[derive(Clone, Debug)]
pub struct RoundSummary {
    pub number: usize,
    pub scores: ScoreTable,
    pub records: Vec<MatchRecord>,
}

/// A round-robin league over a fixed set of teams
pub struct League<R: MatchRunner> {
    teams: TranslationTable,
    rounds: Vec<Round>,
    puntuations: ScoreTable,
    puntuations_by_round: Vec<ScoreTable>,
    number_of_rounds: usize,
    actual_round: usize,
    completed: bool,
    log: TournamentLog,
    games_dir: Option<PathBuf>,
    runner: R,
}

impl<R: MatchRunner> League<R> {
    /// Build a league from team definition paths
    pub fn new<I, P>(paths: I, config: &LeagueConfig, runner: R) -> Result<Self, LeagueError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let teams = TranslationTable::from_paths(paths)?;
        Self::from_table(teams, config, runner)
    }

    /// Build a league from an existing translation table. Every round is
    /// created here and never rebuilt.
    pub fn from_table(
        teams: TranslationTable,
        config: &LeagueConfig,
        mut runner: R,
    ) -> Result<Self, LeagueError> {
        let schedule = make_pairings(teams.keys(), config.back_round)?;
        runner.prepare(&teams)?;

        let mut keys = teams.keys().to_vec();
        if keys.len() % 2 == 1 {
            keys.push(GHOST_TEAM.to_string());
        }

        let rounds: Vec<Round> = schedule
            .into_iter()
            .enumerate()
            .map(|(i, pairings)| Round::new(i + 1, pairings, &keys, config.scoring))
            .collect();
        let number_of_rounds = rounds.len();

        info!(
            teams = teams.len(),
            rounds = number_of_rounds,
            back_round = config.back_round,
            log = %config.log_path.display(),
            "League created"
        );

        Ok(Self {
            teams,
            rounds,
            puntuations: ScoreTable::new(keys),
            puntuations_by_round: Vec::new(),
            number_of_rounds,
            actual_round: 0,
            completed: false,
            log: TournamentLog::new(&config.log_path),
            games_dir: config.games_dir.clone(),
            runner,
        })
    }

    /// Rounds played so far (0-based cursor of the next round)
    pub fn get_round_number(&self) -> usize {
        self.actual_round
    }

    /// Index of the last played round, `None` before the first
    pub fn get_prev_round_number(&self) -> Option<usize> {
        self.actual_round.checked_sub(1)
    }

    pub fn get_number_of_rounds(&self) -> usize {
        self.number_of_rounds
    }

    pub fn get_round(&self, round_number: usize) -> Option<&Round> {
        self.rounds.get(round_number)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn teams(&self) -> &TranslationTable {
        &self.teams
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Play the next round. Returns `None` once the league is completed.
    pub fn play_round(&mut self) -> Result<Option<RoundSummary>, LeagueError> {
        self.play_round_with_progress(|_| ControlFlow::Continue(()))
    }

    /// Play the next round, reporting after every match.
    ///
    /// Returning `ControlFlow::Break` from `progress` cancels the round. On
    /// cancellation or any error the round is reset and the league (cursor,
    /// totals, history and log file) is left exactly as before the call.
    pub fn play_round_with_progress<F>(
        &mut self,
        mut progress: F,
    ) -> Result<Option<RoundSummary>, LeagueError>
    where
        F: FnMut(&MatchProgress<'_>) -> ControlFlow<()>,
    {
        if self.completed {
            return Ok(None);
        }

        let index = self.actual_round;
        let round = &mut self.rounds[index];
        let number = round.number();

        let played = run_matches(
            round,
            &mut self.runner,
            &self.teams,
            self.games_dir.as_deref(),
            &mut progress,
        )
        .and_then(|()| write_round(round, &self.puntuations, &self.log));

        let (round_scores, totals) = match played {
            Ok(scores) => scores,
            Err(err) => {
                warn!(round = number, error = %err, "Round rolled back");
                round.reset();
                if let Some(dir) = self.games_dir.as_deref() {
                    discard_game_logs(round, dir);
                }
                return Err(err);
            }
        };

        let summary = RoundSummary {
            number,
            scores: round_scores.clone(),
            records: round.records().cloned().collect(),
        };

        self.puntuations = totals;
        self.puntuations_by_round.push(round_scores);
        self.actual_round += 1;
        self.completed = self.actual_round == self.number_of_rounds;

        info!(
            round = number,
            of = self.number_of_rounds,
            matches = summary.records.len(),
            "Round complete"
        );
        if self.completed {
            info!(log = %self.log.path().display(), "League complete");
        }

        Ok(Some(summary))
    }

    /// Play every remaining round
    pub fn play_all<F>(&mut self, mut progress: F) -> Result<Vec<RoundSummary>, LeagueError>
    where
        F: FnMut(&MatchProgress<'_>) -> ControlFlow<()>,
    {
        let mut summaries = Vec::new();
        while let Some(summary) = self.play_round_with_progress(&mut progress)? {
            summaries.push(summary);
        }
        Ok(summaries)
    }

    /// Cumulative points sorted descending (sort ascending, then reverse).
    /// The ghost team is included; see `classification` for presentation.
    pub fn get_actual_puntuations(&self) -> Vec<(String, u32)> {
        let mut ranking = self.puntuations.entries().to_vec();
        ranking.sort_by_key(|(_, points)| *points);
        ranking.reverse();
        ranking
    }

    /// Standings without the ghost team
    pub fn classification(&self) -> Vec<(String, u32)> {
        self.puntuations.classification()
    }

    /// Cumulative score table, ghost included
    pub fn puntuations(&self) -> &ScoreTable {
        &self.puntuations
    }

    /// Per-round score snapshots in play order
    pub fn scores_by_round(&self) -> &[ScoreTable] {
        &self.puntuations_by_round
    }
}

fn run_matches<R, F>(
    round: &mut Round,
    runner: &mut R,
    teams: &TranslationTable,
    games_dir: Option<&Path>,
    progress: &mut F,
) -> Result<(), LeagueError>
where
    R: MatchRunner,
    F: FnMut(&MatchProgress<'_>) -> ControlFlow<()>,
{
    let number = round.number();
    let total = round.get_number_of_games();

    for index in 0..total {
        let record = round.play_match(index, runner, teams, games_dir)?;
        let report = MatchProgress {
            round: number,
            index,
            total,
            record,
        };
        if progress(&report).is_break() {
            return Err(LeagueError::Cancelled(number));
        }
    }
    Ok(())
}

/// Remove whatever game logs a rolled-back round left in `dir`
fn discard_game_logs(round: &Round, dir: &Path) {
    for path in round.game_log_paths(dir) {
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Discarded game log"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Could not discard game log"),
        }
    }
}

/// Merge the round into new totals and append its log block. Nothing in
/// the league is modified here.
fn write_round(
    round: &Round,
    totals: &ScoreTable,
    log: &TournamentLog,
) -> Result<(ScoreTable, ScoreTable), LeagueError> {
    let round_scores = round.get_puntuation();
    let merged = totals.merged(&round_scores)?;

    let mut body = Vec::new();
    round
        .log_tournament(&mut body, true)
        .map_err(|source| LeagueError::LogWriteFailed {
            path: log.path().to_path_buf(),
            source,
        })?;
    log.append_round(round.number(), &body)?;

    Ok((round_scores, merged))
}
