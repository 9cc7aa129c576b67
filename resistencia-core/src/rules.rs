//! Rule function library
//!
//! Pure primitives an agent consults every turn: distances, containment,
//! move deltas and legality, hidden-piece symbols, mirroring and turn
//! ownership. Every function is total: unknown move codes fall through to
//! the "no movement" value `0` instead of failing.

use crate::board::Side;

/// Highest value on the piece scale; `mirror_value` reflects around it
pub const MAX_PIECE_VALUE: i64 = 9;

/// Symbol shown for a piece whose value has not been disclosed
pub const HIDDEN_SYMBOL: &str = "?";

/// Symbol shown for a disclosed piece
pub const DISCLOSED_SYMBOL: &str = " ";

/// Euclidean distance between (x1, y1) and (x2, y2)
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

/// True if (x, y) lies inside the rectangle with corners (x1, y1) and
/// (x2, y2). Corners may be given in either order; edges are inclusive.
pub fn within_bounds(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> bool {
    let in_x = (x1 <= x && x <= x2) || (x1 >= x && x >= x2);
    let in_y = (y1 <= y && y <= y2) || (y1 >= y && y >= y2);
    in_x && in_y
}

/// Smaller of two values. Ties return `n2`.
pub fn minimum<T: PartialOrd>(n1: T, n2: T) -> T {
    if n1 < n2 {
        n1
    } else {
        n2
    }
}

/// Horizontal component of a move code
pub fn move_dx(m: i64) -> i64 {
    match m {
        1 => 1,
        2 => -1,
        _ => 0,
    }
}

/// Vertical component of a move code
pub fn move_dy(m: i64) -> i64 {
    match m {
        3 => 1,
        4 => -1,
        _ => 0,
    }
}

/// True if moving from (x, y) with code `m` stays on a `dim`×`dim` board.
///
/// Code 0 (or any unknown code) is a null move and passes when (x, y) is
/// already on the board; callers reject it before asking. A target past
/// the integer range is off the board.
pub fn move_valid(dim: i64, m: i64, x: i64, y: i64) -> bool {
    match (x.checked_add(move_dx(m)), y.checked_add(move_dy(m))) {
        (Some(nx), Some(ny)) => nx > 0 && nx <= dim && ny > 0 && ny <= dim,
        _ => false,
    }
}

/// Display symbol for a piece given its disclosed flag (0 = hidden)
pub fn piece_symbol(disclosed: i64) -> &'static str {
    if disclosed == 0 {
        HIDDEN_SYMBOL
    } else {
        DISCLOSED_SYMBOL
    }
}

/// Opposite direction of a move code: 1↔2, 3↔4, anything else 0
pub fn symmetric_move(m: i64) -> i64 {
    match m {
        1 => 2,
        2 => 1,
        3 => 4,
        4 => 3,
        _ => 0,
    }
}

/// Opponent-relative complement of a piece value
pub fn mirror_value(p: i64) -> i64 {
    MAX_PIECE_VALUE.wrapping_sub(p)
}

/// Side that moves on absolute turn `ti` when team A started at offset `ta`
pub fn turn_owner(ti: i64, ta: i64) -> Side {
    if ti.wrapping_sub(ta).rem_euclid(2) == 1 {
        Side::A
    } else {
        Side::B
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(2.0, 7.0, 2.0, 7.0), 0.0);
        assert_eq!(distance(1.0, 2.0, 5.0, -1.0), distance(5.0, -1.0, 1.0, 2.0));
    }

    #[test]
    fn test_within_bounds_either_corner_order() {
        assert!(within_bounds(1.0, 1.0, 8.0, 8.0, 1.0, 8.0));
        assert!(within_bounds(8.0, 8.0, 1.0, 1.0, 4.0, 5.0));
        assert!(within_bounds(8.0, 1.0, 1.0, 8.0, 4.0, 5.0));
        assert!(!within_bounds(1.0, 1.0, 8.0, 8.0, 0.0, 5.0));
        assert!(!within_bounds(1.0, 1.0, 8.0, 8.0, 4.0, 9.0));
    }

    #[test]
    fn test_minimum_tie_returns_second() {
        assert_eq!(minimum(1, 2), 1);
        assert_eq!(minimum(3, 2), 2);
        assert_eq!(minimum(2.5, 2.5), 2.5);

        // compares on the first field only
        #[derive(PartialEq)]
        struct Key(i32, &'static str);
        impl PartialOrd for Key {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(&other.0)
            }
        }
        assert_eq!(minimum(Key(1, "first"), Key(1, "second")).1, "second");
    }

    #[test]
    fn test_move_deltas() {
        let deltas: Vec<(i64, i64)> = (1..=4).map(|m| (move_dx(m), move_dy(m))).collect();
        assert_eq!(deltas, vec![(1, 0), (-1, 0), (0, 1), (0, -1)]);

        for m in [-3, 0, 5, 42] {
            assert_eq!((move_dx(m), move_dy(m)), (0, 0));
        }
    }

    #[test]
    fn test_move_valid_edges() {
        assert!(move_valid(8, 1, 7, 1));
        assert!(!move_valid(8, 1, 8, 1));
        assert!(!move_valid(8, 2, 1, 4));
        assert!(move_valid(8, 3, 4, 7));
        assert!(!move_valid(8, 3, 4, 8));
        assert!(!move_valid(8, 4, 4, 1));
        // null move is legal in place
        assert!(move_valid(8, 0, 4, 4));
    }

    #[test]
    fn test_piece_symbol() {
        assert_eq!(piece_symbol(0), "?");
        assert_eq!(piece_symbol(1), " ");
    }

    #[test]
    fn test_symmetric_move_involution() {
        for m in 1..=4 {
            assert_eq!(symmetric_move(symmetric_move(m)), m);
            assert_ne!(symmetric_move(m), m);
        }
        assert_eq!(symmetric_move(0), 0);
        assert_eq!(symmetric_move(7), 0);
    }

    #[test]
    fn test_mirror_value_involution() {
        for p in 0..=9 {
            assert_eq!(mirror_value(mirror_value(p)), p);
        }
        assert_eq!(mirror_value(6), 3);
    }

    #[test]
    fn test_turn_owner_alternates() {
        for ta in -2..=3 {
            for ti in -5..20 {
                assert_ne!(turn_owner(ti, ta), turn_owner(ti + 1, ta));
            }
        }
        assert_eq!(turn_owner(1, 0), Side::A);
        assert_eq!(turn_owner(2, 0), Side::B);
        assert_eq!(turn_owner(2, 1), Side::A);
    }

    #[test]
    fn test_integer_extremes_do_not_overflow() {
        assert!(!move_valid(8, 1, i64::MAX, 1));
        assert!(!move_valid(8, 2, i64::MIN, 1));
        assert!(!move_valid(8, 3, 1, i64::MAX));
        assert!(!move_valid(i64::MAX, 4, 1, i64::MIN));

        assert_eq!(mirror_value(mirror_value(i64::MIN)), i64::MIN);
        assert_eq!(mirror_value(mirror_value(i64::MAX)), i64::MAX);

        // parity survives the wrap: MIN - 1 is odd
        assert_eq!(turn_owner(i64::MIN, 1), Side::A);
        assert_eq!(turn_owner(i64::MAX, i64::MIN), Side::A);
        assert_ne!(turn_owner(i64::MIN, 0), turn_owner(i64::MIN + 1, 0));
    }
}
