//! The distribution engine: deck preparation, base hands, and the
//! fair random fallback for leftover cards.
//!
//! None of these functions persist anything. They transform a `Game`
//! (or return plain assignment lists) and leave the atomic commit to
//! the caller — the game actor writes results through the store in a
//! single batch so a failure can't leave hands half-dealt.

use std::collections::HashMap;

use cardhall_protocol::{AuctionPhase, Card, Game, GameStatus, Player, PlayerId, WinningCards};
use rand::seq::IndexedRandom;

use crate::deck::{prize_split, shuffled};
use crate::EngineError;

/// The result of dividing deck 2 into base hands.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// One contiguous hand per player, in player-list order.
    pub hands: Vec<(PlayerId, Vec<Card>)>,
    /// Cards left after equal division — these go to auction.
    pub leftovers: Vec<Card>,
}

/// Prepares a game's decks and winning cards.
///
/// This is the single `waiting → dealing` transition: two independent
/// uniformly-shuffled permutations of the catalog, the first
/// `winner_count` cards of deck 1 drawn as the winning set, and the
/// prize pool split over them by the fixed percentage table. The
/// auction is written as an `Inactive` placeholder.
///
/// Must not be re-entered for the same game; the per-game command
/// queue guarantees that, and the status check rejects a second call.
///
/// # Errors
/// - [`EngineError::InvalidState`] if the game already left `waiting`
/// - [`EngineError::WinnerCountOutOfRange`] for winner counts outside 1–7
/// - [`EngineError::CatalogTooSmall`] if there would be no cards left to deal
pub fn setup_game(game: &mut Game, catalog: &[Card]) -> Result<(), EngineError> {
    if game.status != GameStatus::Waiting {
        return Err(EngineError::InvalidState {
            game: game.id,
            reason: format!("setup requires status waiting, game is {}", game.status),
        });
    }

    let winners = usize::from(game.winner_count);
    // At least one card per deck must survive winner selection.
    if catalog.len() <= winners {
        return Err(EngineError::CatalogTooSmall {
            catalog: catalog.len(),
            required: winners + 1,
        });
    }

    let prizes = prize_split(game.prize_pool, game.winner_count)?;

    let mut deck1 = shuffled(catalog);
    let deck2 = shuffled(catalog);
    let winning: Vec<Card> = deck1.drain(..winners).collect();

    tracing::info!(
        game_id = %game.id,
        winners,
        deck = deck2.len(),
        "game setup: decks shuffled, winners drawn"
    );

    game.deck1 = deck1;
    game.deck2 = deck2;
    game.winning_cards = Some(WinningCards { cards: winning, prizes });
    game.auction = AuctionPhase::Inactive;
    game.status = GameStatus::Dealing;
    Ok(())
}

/// Splits `deck` into `⌊|deck| / player_count⌋`-sized contiguous hands,
/// one per player in player-list order. Whatever doesn't divide evenly
/// becomes the leftover list.
///
/// Does not persist — the caller commits hands and routes leftovers.
pub fn deal_hands(deck: &[Card], players: &[Player]) -> Result<Distribution, EngineError> {
    if players.is_empty() {
        return Err(EngineError::NoPlayers);
    }

    let per_player = deck.len() / players.len();
    let hands = players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let hand = deck[i * per_player..(i + 1) * per_player].to_vec();
            (player.id, hand)
        })
        .collect();
    let leftovers = deck[players.len() * per_player..].to_vec();

    Ok(Distribution { hands, leftovers })
}

/// Fairly assigns leftover cards that nobody bought at auction.
///
/// Repeatedly: find the players holding the current minimum card
/// count, pick one of them uniformly at random, give them the next
/// card (the leftover list is shuffled first), bump their counter.
/// After completion no player holds more than one extra card relative
/// to any other.
///
/// `counts` is the current per-player card tally; players missing from
/// it are treated as holding zero cards.
pub fn balance_leftovers(
    players: &[PlayerId],
    counts: &HashMap<PlayerId, usize>,
    leftovers: Vec<Card>,
) -> Result<Vec<(PlayerId, Card)>, EngineError> {
    if players.is_empty() {
        return Err(EngineError::NoPlayers);
    }

    let mut tally: HashMap<PlayerId, usize> = players
        .iter()
        .map(|p| (*p, counts.get(p).copied().unwrap_or(0)))
        .collect();

    let mut rng = rand::rng();
    let mut assignments = Vec::with_capacity(leftovers.len());

    for card in shuffled(&leftovers) {
        let min = tally.values().copied().min().unwrap_or(0);
        let eligible: Vec<PlayerId> = players
            .iter()
            .copied()
            .filter(|p| tally[p] == min)
            .collect();
        // `eligible` is never empty: the minimum is attained by someone.
        let chosen = *eligible.choose(&mut rng).expect("minimum always attained");
        *tally.get_mut(&chosen).expect("player in tally") += 1;
        assignments.push((chosen, card));
    }

    Ok(assignments)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cardhall_protocol::{CardId, GameId};
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

    fn player(id: u64) -> Player {
        Player {
            id: PlayerId(id),
            nickname: format!("player-{id}"),
            joined_at_ms: 0,
        }
    }

    fn waiting_game(winner_count: u8) -> Game {
        Game::new(GameId(1), "AB12", 50, winner_count, 1_000.0, 10)
    }

    // =====================================================================
    // setup_game()
    // =====================================================================

    #[test]
    fn test_setup_game_draws_winner_count_cards() {
        let mut game = waiting_game(5);
        setup_game(&mut game, &catalog(40)).unwrap();

        let winning = game.winning_cards.as_ref().unwrap();
        assert_eq!(winning.cards.len(), 5);
        assert_eq!(winning.prizes.len(), 5);
        assert_eq!(game.deck1.len(), 35, "winners come off deck1");
        assert_eq!(game.deck2.len(), 40, "deck2 keeps the full catalog");
        assert_eq!(game.status, GameStatus::Dealing);
        assert_eq!(game.auction, AuctionPhase::Inactive);
    }

    #[test]
    fn test_setup_game_prizes_sum_to_pool() {
        let mut game = waiting_game(3);
        setup_game(&mut game, &catalog(40)).unwrap();

        let winning = game.winning_cards.as_ref().unwrap();
        assert_eq!(winning.prizes, vec![500.0, 300.0, 200.0]);
        let sum: f64 = winning.prizes.iter().sum();
        assert!((sum - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_setup_game_winners_not_left_in_deck1() {
        let mut game = waiting_game(7);
        setup_game(&mut game, &catalog(40)).unwrap();

        let winners: BTreeSet<CardId> = game
            .winning_cards
            .as_ref()
            .unwrap()
            .cards
            .iter()
            .map(|c| c.id)
            .collect();
        assert!(game.deck1.iter().all(|c| !winners.contains(&c.id)));
    }

    #[test]
    fn test_setup_game_rejects_non_waiting_status() {
        let mut game = waiting_game(2);
        game.status = GameStatus::Dealing;

        let result = setup_game(&mut game, &catalog(40));
        assert!(matches!(result, Err(EngineError::InvalidState { .. })));
    }

    #[test]
    fn test_setup_game_is_not_reentrant() {
        let mut game = waiting_game(2);
        setup_game(&mut game, &catalog(40)).unwrap();

        // The first call moved the game to dealing; a second must fail.
        let result = setup_game(&mut game, &catalog(40));
        assert!(matches!(result, Err(EngineError::InvalidState { .. })));
    }

    #[test]
    fn test_setup_game_rejects_tiny_catalog() {
        let mut game = waiting_game(5);
        let result = setup_game(&mut game, &catalog(5));
        assert!(matches!(
            result,
            Err(EngineError::CatalogTooSmall { catalog: 5, required: 6 })
        ));
    }

    #[test]
    fn test_setup_game_rejects_bad_winner_count() {
        let mut game = waiting_game(9);
        let result = setup_game(&mut game, &catalog(40));
        assert!(matches!(result, Err(EngineError::WinnerCountOutOfRange(9))));
    }

    // =====================================================================
    // deal_hands()
    // =====================================================================

    #[test]
    fn test_deal_hands_three_players_35_cards() {
        // The canonical scenario: 40-card catalog, 5 winners → 35 cards,
        // 3 players → 11 each and 2 leftovers for the auction.
        let deck = catalog(35);
        let players = vec![player(1), player(2), player(3)];

        let dist = deal_hands(&deck, &players).unwrap();

        assert_eq!(dist.hands.len(), 3);
        for (_, hand) in &dist.hands {
            assert_eq!(hand.len(), 11);
        }
        assert_eq!(dist.leftovers.len(), 2);
    }

    #[test]
    fn test_deal_hands_are_contiguous_and_disjoint() {
        let deck = catalog(10);
        let players = vec![player(1), player(2), player(3)];

        let dist = deal_hands(&deck, &players).unwrap();

        // Hands follow player-list order over the deck prefix.
        assert_eq!(dist.hands[0].1, deck[0..3]);
        assert_eq!(dist.hands[1].1, deck[3..6]);
        assert_eq!(dist.hands[2].1, deck[6..9]);
        assert_eq!(dist.leftovers, deck[9..]);
    }

    #[test]
    fn test_deal_hands_even_split_leaves_no_leftovers() {
        let deck = catalog(36);
        let players = vec![player(1), player(2), player(3)];

        let dist = deal_hands(&deck, &players).unwrap();
        assert!(dist.leftovers.is_empty());
    }

    #[test]
    fn test_deal_hands_no_players_fails() {
        let result = deal_hands(&catalog(10), &[]);
        assert!(matches!(result, Err(EngineError::NoPlayers)));
    }

    // =====================================================================
    // balance_leftovers()
    // =====================================================================

    #[test]
    fn test_balance_leftovers_max_spread_is_one() {
        // Every combination of leftover and player counts must end with
        // a spread of at most one card between any two players.
        for players_n in 2..=6u64 {
            for leftover_n in 0..=13u32 {
                let players: Vec<PlayerId> = (1..=players_n).map(PlayerId).collect();
                let counts: HashMap<PlayerId, usize> =
                    players.iter().map(|p| (*p, 11)).collect();

                let assignments =
                    balance_leftovers(&players, &counts, catalog(leftover_n)).unwrap();

                let mut tally = counts.clone();
                for (p, _) in &assignments {
                    *tally.get_mut(p).unwrap() += 1;
                }
                let max = tally.values().max().unwrap();
                let min = tally.values().min().unwrap();
                assert!(
                    max - min <= 1,
                    "{players_n} players, {leftover_n} leftovers: spread {max}-{min}"
                );
            }
        }
    }

    #[test]
    fn test_balance_leftovers_prefers_deficient_player() {
        // One player is short a card; the single leftover must go to them.
        let players = vec![PlayerId(1), PlayerId(2), PlayerId(3)];
        let counts = HashMap::from([
            (PlayerId(1), 11),
            (PlayerId(2), 10),
            (PlayerId(3), 11),
        ]);

        let assignments = balance_leftovers(&players, &counts, catalog(1)).unwrap();

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].0, PlayerId(2));
    }

    #[test]
    fn test_balance_leftovers_assigns_every_card_once() {
        let players = vec![PlayerId(1), PlayerId(2)];
        let counts = HashMap::new();
        let leftovers = catalog(7);

        let assignments =
            balance_leftovers(&players, &counts, leftovers.clone()).unwrap();

        assert_eq!(assignments.len(), 7);
        let assigned: BTreeSet<CardId> = assignments.iter().map(|(_, c)| c.id).collect();
        let expected: BTreeSet<CardId> = leftovers.iter().map(|c| c.id).collect();
        assert_eq!(assigned, expected);
    }

    #[test]
    fn test_balance_leftovers_empty_list_is_noop() {
        let players = vec![PlayerId(1), PlayerId(2)];
        let assignments =
            balance_leftovers(&players, &HashMap::new(), Vec::new()).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_balance_leftovers_no_players_fails() {
        let result = balance_leftovers(&[], &HashMap::new(), catalog(3));
        assert!(matches!(result, Err(EngineError::NoPlayers)));
    }
}
