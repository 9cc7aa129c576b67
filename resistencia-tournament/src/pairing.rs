//! Pairing generation - round-robin schedules and gauntlet rounds
//!
//! Level 3 - Steps

use resistencia_core::Side;

use crate::error::LeagueError;

/// Synthetic opponent added to odd-sized leagues; pairing against it is a bye
pub const GHOST_TEAM: &str = "aux_ghost_team";

/// (home, away) team keys; home plays side A
pub type Pairing = (String, String);

/// One round of pairings
pub type RoundPairings = Vec<Pairing>;

pub fn is_ghost(key: &str) -> bool {
    key == GHOST_TEAM
}

/// Round-robin schedule by the circle method.
///
/// The first key stays fixed while the rest rotate one place per round.
/// Odd key counts get the ghost appended. Each leg has N-1 rounds of N/2
/// pairs and contains every unordered pair exactly once; `back_round`
/// appends a second leg with home and away swapped.
pub fn make_pairings(keys: &[String], back_round: bool) -> Result<Vec<RoundPairings>, LeagueError> {
    validate_keys(keys)?;

    let mut teams: Vec<&str> = keys.iter().map(String::as_str).collect();
    if teams.len() % 2 == 1 {
        teams.push(GHOST_TEAM);
    }

    let n = teams.len();
    let mut rotation: Vec<usize> = (0..n).collect();
    let mut rounds = Vec::with_capacity(if back_round { 2 * (n - 1) } else { n - 1 });

    for round in 0..n - 1 {
        let pairs: RoundPairings = (0..n / 2)
            .map(|i| {
                let (a, b) = (rotation[i], rotation[n - 1 - i]);
                // the fixed team alternates home and away
                let (home, away) = if i == 0 && round % 2 == 1 { (b, a) } else { (a, b) };
                (teams[home].to_string(), teams[away].to_string())
            })
            .collect();
        rounds.push(pairs);

        if let Some(last) = rotation.pop() {
            rotation.insert(1, last);
        }
    }

    if back_round {
        let second_leg: Vec<RoundPairings> = rounds
            .iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|(home, away)| (away.clone(), home.clone()))
                    .collect()
            })
            .collect();
        rounds.extend(second_leg);
    }

    Ok(rounds)
}

/// One gauntlet round: `main` against every opponent, always on `main_side`
pub fn gauntlet_pairing(
    main: &str,
    opponents: &[String],
    main_side: Side,
) -> Result<RoundPairings, LeagueError> {
    if opponents.is_empty() {
        return Err(LeagueError::TooFewTeams(1));
    }
    if opponents.iter().any(|o| o == main) {
        return Err(LeagueError::DuplicateTeam(main.to_string()));
    }

    Ok(opponents
        .iter()
        .map(|opponent| match main_side {
            Side::A => (main.to_string(), opponent.clone()),
            Side::B => (opponent.clone(), main.to_string()),
        })
        .collect())
}

fn validate_keys(keys: &[String]) -> Result<(), LeagueError> {
    if keys.len() < 2 {
        return Err(LeagueError::TooFewTeams(keys.len()));
    }
    for (i, key) in keys.iter().enumerate() {
        if is_ghost(key) {
            return Err(LeagueError::ReservedTeamName(key.clone()));
        }
        if keys[..i].contains(key) {
            return Err(LeagueError::DuplicateTeam(key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t{}", i)).collect()
    }

    fn unordered(pair: &Pairing) -> (String, String) {
        if pair.0 < pair.1 {
            pair.clone()
        } else {
            (pair.1.clone(), pair.0.clone())
        }
    }

    #[test]
    fn test_single_leg_coverage() {
        for n in [2, 4, 6, 8, 10] {
            let rounds = make_pairings(&keys(n), false).unwrap();
            assert_eq!(rounds.len(), n - 1);

            let mut seen = HashSet::new();
            for round in &rounds {
                assert_eq!(round.len(), n / 2);
                let mut in_round = HashSet::new();
                for pair in round {
                    assert_ne!(pair.0, pair.1);
                    assert!(in_round.insert(pair.0.clone()));
                    assert!(in_round.insert(pair.1.clone()));
                    assert!(seen.insert(unordered(pair)), "pair repeated: {:?}", pair);
                }
            }
            assert_eq!(seen.len(), n * (n - 1) / 2);
        }
    }

    #[test]
    fn test_back_round_reverses_first_leg() {
        let rounds = make_pairings(&keys(4), true).unwrap();
        assert_eq!(rounds.len(), 6);

        for (first, second) in rounds[..3].iter().zip(&rounds[3..]) {
            for (a, b) in first.iter().zip(second) {
                assert_eq!((a.0.as_str(), a.1.as_str()), (b.1.as_str(), b.0.as_str()));
            }
        }

        let mut counts = std::collections::HashMap::new();
        for pair in rounds.iter().flatten() {
            *counts.entry(unordered(pair)).or_insert(0) += 1;
        }
        assert!(counts.values().all(|&c| c == 2));
        assert_eq!(counts.len(), 6);
    }

    #[test]
    fn test_odd_count_adds_ghost() {
        let rounds = make_pairings(&keys(5), false).unwrap();
        assert_eq!(rounds.len(), 5);

        for round in &rounds {
            assert_eq!(round.len(), 3);
            let byes = round
                .iter()
                .filter(|(h, a)| is_ghost(h) || is_ghost(a))
                .count();
            assert_eq!(byes, 1);
        }

        // every real team sits out exactly once
        let mut rested = HashSet::new();
        for (home, away) in rounds.iter().flatten() {
            if is_ghost(home) {
                assert!(rested.insert(away.clone()));
            } else if is_ghost(away) {
                assert!(rested.insert(home.clone()));
            }
        }
        assert_eq!(rested.len(), 5);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            make_pairings(&keys(6), true).unwrap(),
            make_pairings(&keys(6), true).unwrap()
        );
    }

    #[test]
    fn test_two_teams() {
        let rounds = make_pairings(&keys(2), false).unwrap();
        assert_eq!(rounds, vec![vec![("t0".to_string(), "t1".to_string())]]);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(matches!(make_pairings(&keys(1), false), Err(LeagueError::TooFewTeams(1))));
        assert!(matches!(make_pairings(&[], false), Err(LeagueError::TooFewTeams(0))));

        let dup = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert!(matches!(make_pairings(&dup, false), Err(LeagueError::DuplicateTeam(_))));

        let ghost = vec!["a".to_string(), GHOST_TEAM.to_string()];
        assert!(matches!(make_pairings(&ghost, false), Err(LeagueError::ReservedTeamName(_))));
    }

    #[test]
    fn test_gauntlet_pairing_sides() {
        let opponents = vec!["x".to_string(), "y".to_string()];

        let as_a = gauntlet_pairing("main", &opponents, Side::A).unwrap();
        assert_eq!(as_a[0], ("main".to_string(), "x".to_string()));

        let as_b = gauntlet_pairing("main", &opponents, Side::B).unwrap();
        assert_eq!(as_b[1], ("y".to_string(), "main".to_string()));

        assert!(gauntlet_pairing("main", &[], Side::A).is_err());
        assert!(gauntlet_pairing("x", &opponents, Side::A).is_err());
    }
}
