//! Options and helpers shared by every command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use resistencia_core::GameConfig;

/// Game parameters that override the configuration file
#[derive(Args, Clone, Debug, Default)]
pub struct GameOptions {
    /// Seed for random agents
    #[arg(long)]
    pub seed: Option<u64>,

    /// Turn limit per game (reaching it is a draw)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Squares per board side
    #[arg(long)]
    pub board_size: Option<i64>,
}

impl GameOptions {
    pub fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max_turns) = self.max_turns {
            config.max_turns = max_turns;
        }
        if let Some(board_size) = self.board_size {
            config.board_size = board_size;
        }
        config
    }
}

/// `{prefix}_{YYYY-mm-dd_HH-MM-SS}.{ext}`
pub fn timestamped_filename(prefix: &str, ext: &str) -> String {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.{}", prefix, stamp, ext)
}

/// Create the games directory if needed
pub fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

pub fn progress_bar(len: usize, what: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(&format!("[{{bar:30}}] {{pos}}/{{len}} {} {{msg}}", what))?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// `name ------ points`, names padded to a 29-column dash run
pub fn standing_line(name: &str, points: u32) -> String {
    let dashes = 29usize.saturating_sub(name.chars().count());
    format!("{} {} {}", name, "-".repeat(dashes), points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_line_padding() {
        assert_eq!(standing_line("abc", 7), format!("abc {} 7", "-".repeat(26)));
        let long = "x".repeat(40);
        assert_eq!(standing_line(&long, 1), format!("{}  1", long));
    }

    #[test]
    fn test_game_options_override() {
        let options = GameOptions {
            seed: Some(5),
            max_turns: None,
            board_size: Some(10),
        };
        let config = options.apply(GameConfig::default());
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.board_size, 10);
        assert_eq!(config.max_turns, GameConfig::default().max_turns);
    }

    #[test]
    fn test_timestamped_filename_shape() {
        let name = timestamped_filename("tournament", "txt");
        assert!(name.starts_with("tournament_"));
        assert!(name.ends_with(".txt"));
    }
}
