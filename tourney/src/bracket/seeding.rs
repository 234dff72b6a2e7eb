//! Standard single-elimination seeding.
//!
//! Seeds are placed so that the two strongest seeds sit in opposite halves
//! of the draw and can only meet in the final. For eight entries the first
//! round is `(1,8) (4,5) (2,7) (3,6)`.

use crate::errors::{EngineError, EngineResult};

/// Byes are not supported, so a bracket needs 2, 4, 8, ... entries
pub fn is_valid_bracket_size(n: usize) -> bool {
    n >= 2 && n.is_power_of_two()
}

/// Number of rounds for `n` entries
pub fn round_count(n: usize) -> u32 {
    n.trailing_zeros()
}

/// Seed occupying the top slot of each first-round match, in draw order.
///
/// Starts from `[1]` and, for each further round, replaces every seed `s`
/// with `s, 2^i + 1 - s`.
pub fn draw_order(n: usize) -> EngineResult<Vec<u32>> {
    if !is_valid_bracket_size(n) {
        return Err(EngineError::InvalidParticipantCount(n));
    }

    let mut seeds = vec![1u32];
    for i in 1..round_count(n) {
        let mirror = (1u32 << i) + 1;
        seeds = seeds.iter().flat_map(|&s| [s, mirror - s]).collect();
    }

    Ok(seeds)
}

/// First-round seed pairings; the index + 1 is the match position.
pub fn seed_pairs(n: usize) -> EngineResult<Vec<(u32, u32)>> {
    let n32 = u32::try_from(n).map_err(|_| EngineError::InvalidParticipantCount(n))?;
    Ok(draw_order(n)?
        .into_iter()
        .map(|s| (s, n32 - s + 1))
        .collect())
}

/// Pair up entries that are already sorted by ascending seed
pub fn pair_entries<T: Clone>(ordered: &[T]) -> EngineResult<Vec<(T, T)>> {
    Ok(seed_pairs(ordered.len())?
        .into_iter()
        .map(|(a, b)| {
            (
                ordered[a as usize - 1].clone(),
                ordered[b as usize - 1].clone(),
            )
        })
        .collect())
}

/// Position of the sibling match whose winner meets this one's next round
pub fn partner_position(position: u32) -> u32 {
    if position % 2 == 0 {
        position - 1
    } else {
        position + 1
    }
}

/// Position in the following round fed by this position
pub fn next_round_position(position: u32) -> u32 {
    position.div_ceil(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_entry_draw() {
        assert_eq!(
            seed_pairs(8).unwrap(),
            vec![(1, 8), (4, 5), (2, 7), (3, 6)]
        );
    }

    #[test]
    fn test_small_draws() {
        assert_eq!(seed_pairs(2).unwrap(), vec![(1, 2)]);
        assert_eq!(seed_pairs(4).unwrap(), vec![(1, 4), (2, 3)]);
    }

    #[test]
    fn test_sixteen_entry_draw() {
        assert_eq!(
            draw_order(16).unwrap(),
            vec![1, 8, 4, 5, 2, 7, 3, 6]
        );
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        for n in [0, 1, 3, 6, 12] {
            assert!(matches!(
                seed_pairs(n),
                Err(EngineError::InvalidParticipantCount(got)) if got == n
            ));
        }
    }

    #[test]
    fn test_pair_entries_uses_seed_order() {
        let names = ["a", "b", "c", "d"];
        assert_eq!(
            pair_entries(&names).unwrap(),
            vec![("a", "d"), ("b", "c")]
        );
    }

    #[test]
    fn test_partner_and_next_positions() {
        assert_eq!(partner_position(1), 2);
        assert_eq!(partner_position(2), 1);
        assert_eq!(partner_position(7), 8);
        assert_eq!(next_round_position(1), 1);
        assert_eq!(next_round_position(2), 1);
        assert_eq!(next_round_position(3), 2);
    }

    #[test]
    fn test_round_count() {
        assert_eq!(round_count(2), 1);
        assert_eq!(round_count(8), 3);
        assert_eq!(round_count(64), 6);
    }
}
