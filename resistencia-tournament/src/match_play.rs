//! Match play - the seam between scheduling and game adjudication
//!
//! Level 2 - Phase-level implementation

use std::path::Path;

use resistencia_core::{
    play_game, CoreError, GameConfig, GameLogWriter, GameOutcome, RuleRegistry, Team,
    TeamDefinition,
};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::LeagueError;
use crate::translation::TranslationTable;

/// Plays one match between two teams. `home` always plays side A.
pub trait MatchRunner {
    /// Called once before the first round with every participant
    fn prepare(&mut self, _teams: &TranslationTable) -> Result<(), LeagueError> {
        Ok(())
    }

    /// Play a match; when `game_log` is given the runner writes the
    /// turn-by-turn disclosure log there, replacing any earlier file
    fn play(
        &mut self,
        home: &Team,
        away: &Team,
        game_log: Option<&Path>,
    ) -> Result<GameOutcome, CoreError>;
}

/// Runner driving the built-in rule agents
pub struct RuleMatchRunner {
    config: GameConfig,
    registry: RuleRegistry,
    definitions: FxHashMap<String, TeamDefinition>,
}

impl RuleMatchRunner {
    pub fn new(config: GameConfig) -> Self {
        Self::with_registry(config, RuleRegistry::standard())
    }

    pub fn with_registry(config: GameConfig, registry: RuleRegistry) -> Self {
        Self {
            config,
            registry,
            definitions: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Load, validate and cache a team definition
    fn definition(&mut self, team: &Team) -> Result<TeamDefinition, CoreError> {
        if let Some(def) = self.definitions.get(&team.name) {
            return Ok(def.clone());
        }
        let def = team.load_definition()?;
        def.validate(self.config.board_size, &team.path)?;
        debug!(team = %team.name, pieces = def.pieces.len(), "Loaded team definition");
        self.definitions.insert(team.name.clone(), def.clone());
        Ok(def)
    }
}

impl MatchRunner for RuleMatchRunner {
    fn prepare(&mut self, teams: &TranslationTable) -> Result<(), LeagueError> {
        for team in teams.iter() {
            self.definition(team).map_err(LeagueError::MalformedTeam)?;
        }
        Ok(())
    }

    fn play(
        &mut self,
        home: &Team,
        away: &Team,
        game_log: Option<&Path>,
    ) -> Result<GameOutcome, CoreError> {
        let home_def = self.definition(home)?;
        let away_def = self.definition(away)?;

        let mut writer = game_log.map(GameLogWriter::create).transpose()?;
        play_game(&home_def, &away_def, &self.config, &self.registry, writer.as_mut())
    }
}
