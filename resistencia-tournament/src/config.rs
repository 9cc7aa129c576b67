//! Configuration types for leagues and test suites
//!
//! Level 4 - Utilities and configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use resistencia_core::GameConfig;
use serde::{Deserialize, Serialize};

/// Default tournament log file name
pub const DEFAULT_LOG_FILE: &str = "tournament.txt";

/// Default statistics file name for test suites
pub const DEFAULT_STATS_FILE: &str = "stats.csv";

/// Points awarded per match result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    /// Awarded to the real team paired against the ghost
    pub bye: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            win: 3,
            draw: 1,
            loss: 0,
            bye: 3,
        }
    }
}

/// League configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Play a second leg with home and away swapped
    pub back_round: bool,
    /// Tournament log (appended to, never truncated)
    pub log_path: PathBuf,
    /// Directory for per-match game logs (none = no game logs)
    pub games_dir: Option<PathBuf>,
    pub scoring: ScoringConfig,
    pub match_config: GameConfig,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            back_round: false,
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            games_dir: None,
            scoring: ScoringConfig::default(),
            match_config: GameConfig::default(),
        }
    }
}

impl LeagueConfig {
    /// Create config logging to the given file
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Default::default()
        }
    }

    pub fn with_back_round(mut self, back_round: bool) -> Self {
        self.back_round = back_round;
        self
    }

    pub fn with_games_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.games_dir = Some(dir.into());
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_match_config(mut self, match_config: GameConfig) -> Self {
        self.match_config = match_config;
        self
    }

    /// Load from JSON; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read league config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse league config: {}", path.display()))?;
        Ok(config)
    }

    /// Save to JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write league config: {}", path.display()))?;
        Ok(())
    }
}

/// Test suite configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Number of passes over the opponent list
    pub rounds: usize,
    /// CSV statistics file (truncated on start)
    pub stats_path: PathBuf,
    pub games_dir: Option<PathBuf>,
    pub match_config: GameConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            stats_path: PathBuf::from(DEFAULT_STATS_FILE),
            games_dir: None,
            match_config: GameConfig::default(),
        }
    }
}

impl SuiteConfig {
    pub fn new(rounds: usize, stats_path: impl Into<PathBuf>) -> Self {
        Self {
            rounds,
            stats_path: stats_path.into(),
            ..Default::default()
        }
    }

    pub fn with_games_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.games_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_defaults() {
        let scoring = ScoringConfig::default();
        assert_eq!((scoring.win, scoring.draw, scoring.loss, scoring.bye), (3, 1, 0, 3));
    }

    #[test]
    fn test_league_config_builders() {
        let config = LeagueConfig::new("out/t.txt")
            .with_back_round(true)
            .with_games_dir("out/games");
        assert!(config.back_round);
        assert_eq!(config.log_path, PathBuf::from("out/t.txt"));
        assert_eq!(config.games_dir, Some(PathBuf::from("out/games")));
        assert_eq!(config.match_config, GameConfig::default());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.json");
        std::fs::write(&path, r#"{"back_round": true, "scoring": {"win": 2}}"#).unwrap();

        let config = LeagueConfig::load(&path).unwrap();
        assert!(config.back_round);
        assert_eq!(config.scoring.win, 2);
        assert_eq!(config.scoring.draw, 1);
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.json");
        let config = LeagueConfig::new("x.txt").with_match_config(GameConfig::default().with_seed(9));
        config.save(&path).unwrap();
        assert_eq!(LeagueConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_suite_config_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.rounds, 2);
        assert_eq!(config.stats_path, PathBuf::from(DEFAULT_STATS_FILE));
    }
}
