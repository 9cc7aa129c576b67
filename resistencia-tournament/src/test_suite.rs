//! Test suite - one team against a gauntlet of opponents
//!
//! Level 1 - Orchestration
//!
//! The main team meets every opponent once per round, playing side A on
//! even rounds and side B on odd ones. Every match becomes a CSV row.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use resistencia_core::{GameOutcome, Side};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SuiteConfig;
use crate::error::LeagueError;
use crate::match_play::MatchRunner;
use crate::pairing::gauntlet_pairing;
use crate::round::game_log_name;
use crate::translation::TranslationTable;

/// Totals for the main team over the whole suite
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Sum of turns over won matches
    pub turns_winning: u32,
    /// Sum of turns over lost matches
    pub turns_losing: u32,
    /// Surviving pieces, summed over matches
    pub num_pieces: u32,
    /// Surviving piece value, summed over matches
    pub val_pieces: i64,
    /// Sum of the turns in which the main team's top piece died
    pub max_death: u32,
}

impl SuiteStats {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    fn record(&mut self, row: &SuiteRow) {
        match row.result {
            MatchResult::Win => {
                self.wins += 1;
                self.turns_winning += row.turns;
            }
            MatchResult::Lose => {
                self.losses += 1;
                self.turns_losing += row.turns;
            }
            MatchResult::Draw => self.draws += 1,
        }
        self.num_pieces += row.pieces;
        self.val_pieces += row.value;
        self.max_death += row.max_death.unwrap_or(0);
    }
}

/// Result from the main team's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Lose,
    Draw,
}

/// One line of the statistics CSV
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteRow {
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "As team")]
    pub side: Side,
    #[serde(rename = "Result")]
    pub result: MatchResult,
    #[serde(rename = "Number of turns")]
    pub turns: u32,
    #[serde(rename = "Number of pieces")]
    pub pieces: u32,
    #[serde(rename = "Value of the pieces")]
    pub value: i64,
    #[serde(rename = "Turn when max value piece died")]
    pub max_death: Option<u32>,
}

impl SuiteRow {
    fn new(opponent: &str, side: Side, outcome: &GameOutcome) -> Self {
        let result = match outcome.winner() {
            Some(winner) if winner == side => MatchResult::Win,
            Some(_) => MatchResult::Lose,
            None => MatchResult::Draw,
        };
        let report = outcome.report(side);
        Self {
            opponent: opponent.to_string(),
            side,
            result,
            turns: outcome.turns,
            pieces: report.pieces,
            value: report.value,
            max_death: report.max_value_death,
        }
    }
}

/// Reported after every suite match
#[derive(Clone, Copy, Debug)]
pub struct SuiteProgress<'a> {
    /// 0-based suite round
    pub round: usize,
    /// Matches finished so far
    pub played: usize,
    pub total: usize,
    pub row: &'a SuiteRow,
}

/// Main team versus opponents, repeated for a number of rounds
pub struct TestSuite<R: MatchRunner> {
    main: String,
    opponents: Vec<String>,
    teams: TranslationTable,
    rounds_number: usize,
    stats_path: PathBuf,
    games_dir: Option<PathBuf>,
    stats: SuiteStats,
    runner: R,
}

impl<R: MatchRunner> TestSuite<R> {
    pub fn new<I, P>(
        main: impl Into<PathBuf>,
        opponents: I,
        config: &SuiteConfig,
        mut runner: R,
    ) -> Result<Self, LeagueError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = std::iter::once(main.into())
            .chain(opponents.into_iter().map(Into::into))
            .collect();
        let teams = TranslationTable::from_paths(paths)?;
        let (main, opponents) = match teams.keys().split_first() {
            Some((main, rest)) if !rest.is_empty() => (main.clone(), rest.to_vec()),
            _ => return Err(LeagueError::TooFewTeams(teams.len())),
        };
        runner.prepare(&teams)?;

        Ok(Self {
            main,
            opponents,
            teams,
            rounds_number: config.rounds,
            stats_path: config.stats_path.clone(),
            games_dir: config.games_dir.clone(),
            stats: SuiteStats::default(),
            runner,
        })
    }

    pub fn main_team(&self) -> &str {
        &self.main
    }

    pub fn opponents(&self) -> &[String] {
        &self.opponents
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    pub fn get_number_of_games(&self) -> usize {
        self.rounds_number * self.opponents.len()
    }

    /// Play every round and write the statistics CSV (truncating it).
    /// The totals describe the latest finished run, matching the CSV; a
    /// cancelled or failed run keeps the previous totals.
    pub fn run_test_suite<F>(&mut self, mut progress: F) -> Result<SuiteStats, LeagueError>
    where
        F: FnMut(&SuiteProgress<'_>) -> ControlFlow<()>,
    {
        let mut writer =
            csv::Writer::from_path(&self.stats_path).map_err(stats_error(&self.stats_path))?;
        let total = self.get_number_of_games();
        let mut played = 0;
        let mut stats = SuiteStats::default();

        for round in 0..self.rounds_number {
            let side = if round % 2 == 0 { Side::A } else { Side::B };
            let pairings = gauntlet_pairing(&self.main, &self.opponents, side)?;

            for (home, away) in pairings {
                let opponent = if side == Side::A { &away } else { &home };
                let outcome = self.play(&home, &away, round)?;
                let row = SuiteRow::new(opponent, side, &outcome);

                writer.serialize(&row).map_err(stats_error(&self.stats_path))?;
                stats.record(&row);
                played += 1;

                let report = SuiteProgress {
                    round,
                    played,
                    total,
                    row: &row,
                };
                if progress(&report).is_break() {
                    return Err(LeagueError::Cancelled(round + 1));
                }
            }
        }

        writer
            .flush()
            .map_err(|e| stats_error(&self.stats_path)(e.into()))?;

        self.stats = stats;
        info!(
            main = %self.main,
            games = stats.games(),
            wins = stats.wins,
            losses = stats.losses,
            draws = stats.draws,
            "Test suite complete"
        );
        Ok(self.stats)
    }

    pub fn get_test_stats(&self) -> SuiteStats {
        self.stats
    }

    fn play(&mut self, home: &str, away: &str, round: usize) -> Result<GameOutcome, LeagueError> {
        let lookup = |key: &str| {
            self.teams
                .get(key)
                .ok_or_else(|| LeagueError::UnknownTeam(key.to_string()))
        };
        let (home_team, away_team) = (lookup(home)?, lookup(away)?);
        let game_log = self
            .games_dir
            .as_ref()
            .map(|dir| dir.join(game_log_name(home, away, round + 1)));

        self.runner
            .play(home_team, away_team, game_log.as_deref())
            .map_err(|source| LeagueError::Match {
                home: home.to_string(),
                away: away.to_string(),
                source,
            })
    }
}

fn stats_error(path: &Path) -> impl Fn(csv::Error) -> LeagueError {
    let path = path.to_path_buf();
    move |source| LeagueError::StatsWriteFailed {
        path: path.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resistencia_core::{CoreError, EndReason, GameResult, SideReport, Team};

    /// Side A wins with two pieces left; its top piece never dies
    struct SideAWins {
        calls: Vec<(String, String)>,
    }

    impl MatchRunner for SideAWins {
        fn play(&mut self, home: &Team, away: &Team, _: Option<&Path>) -> Result<GameOutcome, CoreError> {
            self.calls.push((home.name.clone(), away.name.clone()));
            Ok(GameOutcome {
                result: GameResult::AWins,
                reason: EndReason::Annihilation,
                turns: 10,
                sides: [
                    SideReport {
                        pieces: 2,
                        value: 11,
                        max_value_death: None,
                    },
                    SideReport {
                        pieces: 0,
                        value: 0,
                        max_value_death: Some(7),
                    },
                ],
            })
        }
    }

    fn suite(dir: &Path, rounds: usize) -> TestSuite<SideAWins> {
        let config = SuiteConfig::new(rounds, dir.join("stats.csv"));
        TestSuite::new("main.json", ["x.json", "y.json"], &config, SideAWins { calls: vec![] }).unwrap()
    }

    #[test]
    fn test_sides_alternate_per_round() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = suite(dir.path(), 2);
        suite.run_test_suite(|_| ControlFlow::Continue(())).unwrap();

        let calls: Vec<_> = suite
            .runner
            .calls
            .iter()
            .map(|(h, a)| format!("{}-{}", h, a))
            .collect();
        assert_eq!(calls, vec!["main-x", "main-y", "x-main", "y-main"]);
    }

    #[test]
    fn test_stats_from_main_team_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = suite(dir.path(), 2);
        let stats = suite.run_test_suite(|_| ControlFlow::Continue(())).unwrap();

        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 2);
        assert_eq!(stats.turns_winning, 20);
        assert_eq!(stats.turns_losing, 20);
        assert_eq!(stats.num_pieces, 4);
        assert_eq!(stats.val_pieces, 22);
        assert_eq!(stats.max_death, 14);
        assert_eq!(suite.get_test_stats(), stats);
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = suite(dir.path(), 2);
        suite.run_test_suite(|_| ControlFlow::Continue(())).unwrap();

        let content = std::fs::read_to_string(suite.stats_path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Opponent,As team,Result,Number of turns,Number of pieces,Value of the pieces,Turn when max value piece died"
        );
        assert_eq!(lines[1], "x,A,Win,10,2,11,");
        assert_eq!(lines[3], "x,B,Lose,10,0,0,7");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_main_team_among_opponents() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::new(1, dir.path().join("s.csv"));
        let result = TestSuite::new("a/main.json", ["b/main.json"], &config, SideAWins { calls: vec![] });
        assert!(matches!(result, Err(LeagueError::DuplicateTeam(_))));

        let empty: [&str; 0] = [];
        let result = TestSuite::new("main.json", empty, &config, SideAWins { calls: vec![] });
        assert!(matches!(result, Err(LeagueError::TooFewTeams(1))));
    }

    #[test]
    fn test_rerun_replaces_totals() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = suite(dir.path(), 2);
        let first = suite.run_test_suite(|_| ControlFlow::Continue(())).unwrap();
        let second = suite.run_test_suite(|_| ControlFlow::Continue(())).unwrap();

        assert_eq!(first, second);
        assert_eq!(suite.get_test_stats().games(), 4);

        let mut reader = csv::Reader::from_path(suite.stats_path()).unwrap();
        let rows = reader.deserialize::<SuiteRow>().count() as u32;
        assert_eq!(rows, suite.get_test_stats().games());
    }

    #[test]
    fn test_cancel_keeps_stats() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = suite(dir.path(), 2);
        let result = suite.run_test_suite(|p| {
            if p.played == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(matches!(result, Err(LeagueError::Cancelled(2))));
        assert_eq!(suite.get_test_stats(), SuiteStats::default());
    }
}
