//! Translation table - short team names to their definitions
//!
//! Level 4 - Utilities

use std::path::PathBuf;

use resistencia_core::Team;
use rustc_hash::FxHashMap;

use crate::error::LeagueError;
use crate::pairing::is_ghost;

/// Team keys in insertion order plus a name → team lookup
#[derive(Clone, Debug, Default)]
pub struct TranslationTable {
    keys: Vec<String>,
    teams: FxHashMap<String, Team>,
}

impl TranslationTable {
    /// Build from definition paths; names are derived from the file stems
    pub fn from_paths<I, P>(paths: I) -> Result<Self, LeagueError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let teams = paths
            .into_iter()
            .map(|path| Team::from_path(path).map_err(LeagueError::MalformedTeam))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_teams(teams)
    }

    pub fn from_teams(teams: impl IntoIterator<Item = Team>) -> Result<Self, LeagueError> {
        let mut table = Self::default();
        for team in teams {
            if is_ghost(&team.name) {
                return Err(LeagueError::ReservedTeamName(team.name));
            }
            if table.teams.contains_key(&team.name) {
                return Err(LeagueError::DuplicateTeam(team.name));
            }
            table.keys.push(team.name.clone());
            table.teams.insert(team.name.clone(), team);
        }
        Ok(table)
    }

    /// Team names in insertion order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Teams in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.keys.iter().filter_map(|key| self.teams.get(key))
    }
}
