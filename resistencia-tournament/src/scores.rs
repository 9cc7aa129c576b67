//! Score tables and ranking
//!
//! Level 4 - Utilities

use serde::{Deserialize, Serialize};

use crate::error::LeagueError;
use crate::pairing::is_ghost;

/// Points per team, keyed by name in a fixed insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    entries: Vec<(String, u32)>,
}

impl ScoreTable {
    /// Every key starts at zero
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: keys.into_iter().map(|k| (k.into(), 0)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, p)| *p)
    }

    pub fn add(&mut self, key: &str, points: u32) -> Result<(), LeagueError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .ok_or_else(|| LeagueError::UnknownTeam(key.to_string()))?;
        entry.1 += points;
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same key set, order ignored
    pub fn same_keys(&self, other: &ScoreTable) -> bool {
        self.entries.len() == other.entries.len()
            && self.keys().all(|k| other.get(k).is_some())
    }

    /// Add every entry of `other` into `self`. The key sets must match and
    /// nothing is modified when they don't.
    pub fn merge(&mut self, other: &ScoreTable) -> Result<(), LeagueError> {
        if !self.same_keys(other) {
            return Err(LeagueError::ScoreKeyMismatch);
        }
        for (key, points) in &other.entries {
            self.add(key, *points)?;
        }
        Ok(())
    }

    /// Element-wise sum as a new table, keeping `self`'s key order
    pub fn merged(&self, other: &ScoreTable) -> Result<ScoreTable, LeagueError> {
        let mut result = self.clone();
        result.merge(other)?;
        Ok(result)
    }

    /// Copy with the ghost team removed
    pub fn without_ghost(&self) -> ScoreTable {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !is_ghost(k))
                .cloned()
                .collect(),
        }
    }

    /// Descending by points. Sorted ascending (stable) and then reversed, so
    /// among equal points the later-inserted team ranks first.
    pub fn classification(&self) -> Vec<(String, u32)> {
        let mut ranking: Vec<(String, u32)> = self
            .entries
            .iter()
            .filter(|(k, _)| !is_ghost(k))
            .cloned()
            .collect();
        ranking.sort_by_key(|(_, points)| *points);
        ranking.reverse();
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::GHOST_TEAM;

    fn table(entries: &[(&str, u32)]) -> ScoreTable {
        let mut t = ScoreTable::new(entries.iter().map(|(k, _)| *k));
        for (k, p) in entries {
            t.add(k, *p).unwrap();
        }
        t
    }

    #[test]
    fn test_new_starts_at_zero() {
        let t = ScoreTable::new(["a", "b"]);
        assert_eq!(t.get("a"), Some(0));
        assert_eq!(t.get("c"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_add_unknown_key() {
        let mut t = ScoreTable::new(["a"]);
        assert!(matches!(t.add("z", 1), Err(LeagueError::UnknownTeam(_))));
    }

    #[test]
    fn test_merge_is_commutative_on_values() {
        let x = table(&[("a", 3), ("b", 1), ("c", 0)]);
        let y = table(&[("c", 4), ("a", 2), ("b", 7)]);

        let xy = x.merged(&y).unwrap();
        let yx = y.merged(&x).unwrap();
        for key in ["a", "b", "c"] {
            assert_eq!(xy.get(key), yx.get(key));
        }
        assert_eq!(xy.get("a"), Some(5));
        assert_eq!(xy.get("b"), Some(8));
        // inputs untouched
        assert_eq!(x.get("a"), Some(3));
    }

    #[test]
    fn test_merge_is_associative() {
        let x = table(&[("a", 3), ("b", 1), ("c", 0)]);
        let y = table(&[("b", 2), ("c", 4), ("a", 0)]);
        let z = table(&[("c", 1), ("a", 6), ("b", 3)]);

        let left = x.merged(&y).unwrap().merged(&z).unwrap();
        let right = x.merged(&y.merged(&z).unwrap()).unwrap();
        assert_eq!(left, right);
        assert_eq!(left, table(&[("a", 9), ("b", 6), ("c", 5)]));
    }

    #[test]
    fn test_merge_key_mismatch_leaves_table_alone() {
        let mut x = table(&[("a", 3), ("b", 1)]);
        let y = table(&[("a", 1), ("c", 1)]);
        assert!(matches!(x.merge(&y), Err(LeagueError::ScoreKeyMismatch)));
        assert_eq!(x, table(&[("a", 3), ("b", 1)]));

        let z = table(&[("a", 1)]);
        assert!(x.merge(&z).is_err());
    }

    #[test]
    fn test_classification_tie_order() {
        let t = table(&[("A", 3), ("B", 5), ("C", 5), ("D", 1)]);
        let ranking = t.classification();
        let names: Vec<_> = ranking.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A", "D"]);
        assert_eq!(ranking[0].1, 5);
    }

    #[test]
    fn test_classification_drops_ghost() {
        let t = table(&[("a", 3), (GHOST_TEAM, 0), ("b", 6)]);
        let ranking = t.classification();
        assert_eq!(ranking.len(), 2);
        assert!(ranking.iter().all(|(k, _)| k != GHOST_TEAM));
        assert_eq!(t.without_ghost().len(), 2);
    }
}
