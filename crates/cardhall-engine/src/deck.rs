//! Card/deck utilities: shuffling and prize-split math.
//!
//! Pure functions, no state. Everything else in the engine builds on
//! these two primitives.

use cardhall_protocol::Card;
use rand::seq::SliceRandom;

use crate::EngineError;

/// Percentage split of the prize pool, indexed by winner count − 1.
///
/// Each row sums to 100. Rank 1 gets the first entry, rank 2 the
/// second, and so on.
const PRIZE_TABLE: [&[u8]; 7] = [
    &[100],                        // 1 winner
    &[60, 40],                     // 2 winners
    &[50, 30, 20],                 // 3 winners
    &[40, 30, 20, 10],             // 4 winners
    &[35, 25, 20, 10, 10],         // 5 winners
    &[30, 25, 20, 10, 10, 5],      // 6 winners
    &[30, 20, 15, 10, 10, 10, 5],  // 7 winners
];

/// Returns a uniformly shuffled copy of `cards` (Fisher–Yates).
///
/// The input is never mutated — both working decks are independent
/// permutations of the same catalog.
pub fn shuffled(cards: &[Card]) -> Vec<Card> {
    let mut deck = cards.to_vec();
    deck.shuffle(&mut rand::rng());
    deck
}

/// Splits `total_prize` over `winner_count` ranks using the fixed
/// percentage table.
///
/// # Errors
/// Returns [`EngineError::WinnerCountOutOfRange`] unless
/// `1 <= winner_count <= 7`.
pub fn prize_split(total_prize: f64, winner_count: u8) -> Result<Vec<f64>, EngineError> {
    if !(1..=7).contains(&winner_count) {
        return Err(EngineError::WinnerCountOutOfRange(winner_count));
    }
    let row = PRIZE_TABLE[winner_count as usize - 1];
    Ok(row
        .iter()
        .map(|&percent| total_prize * f64::from(percent) / 100.0)
        .collect())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cardhall_protocol::CardId;
    use std::collections::BTreeSet;

    fn catalog(n: u32) -> Vec<Card> {
        (0..n)
            .map(|i| Card {
                id: CardId(i),
                name: format!("card-{i}"),
                localized_name: format!("karte-{i}"),
                artwork: None,
            })
            .collect()
    }

    #[test]
    fn test_shuffled_preserves_every_card() {
        let cards = catalog(40);
        let deck = shuffled(&cards);

        assert_eq!(deck.len(), 40);
        let before: BTreeSet<CardId> = cards.iter().map(|c| c.id).collect();
        let after: BTreeSet<CardId> = deck.iter().map(|c| c.id).collect();
        assert_eq!(before, after, "shuffling must not lose or duplicate cards");
    }

    #[test]
    fn test_shuffled_does_not_mutate_input() {
        let cards = catalog(10);
        let original = cards.clone();
        let _ = shuffled(&cards);
        assert_eq!(cards, original);
    }

    #[test]
    fn test_shuffled_twice_gives_independent_permutations() {
        // 52! orderings — two identical shuffles in a row would point at
        // a broken RNG. A flake here is astronomically unlikely.
        let cards = catalog(52);
        let a = shuffled(&cards);
        let b = shuffled(&cards);
        assert_ne!(a, b);
    }

    #[test]
    fn test_prize_split_two_winners_is_60_40() {
        let prizes = prize_split(1_000.0, 2).unwrap();
        assert_eq!(prizes, vec![600.0, 400.0]);
    }

    #[test]
    fn test_prize_split_five_winners_matches_table() {
        let prizes = prize_split(1_000.0, 5).unwrap();
        assert_eq!(prizes, vec![350.0, 250.0, 200.0, 100.0, 100.0]);
    }

    #[test]
    fn test_prize_split_sums_to_pool_for_all_counts() {
        for winners in 1..=7u8 {
            let prizes = prize_split(777.0, winners).unwrap();
            assert_eq!(prizes.len(), winners as usize);
            let sum: f64 = prizes.iter().sum();
            assert!(
                (sum - 777.0).abs() < 1e-6,
                "{winners} winners: prizes sum to {sum}, expected 777"
            );
        }
    }

    #[test]
    fn test_prize_split_rejects_zero_winners() {
        assert!(matches!(
            prize_split(100.0, 0),
            Err(EngineError::WinnerCountOutOfRange(0))
        ));
    }

    #[test]
    fn test_prize_split_rejects_eight_winners() {
        assert!(matches!(
            prize_split(100.0, 8),
            Err(EngineError::WinnerCountOutOfRange(8))
        ));
    }
}
