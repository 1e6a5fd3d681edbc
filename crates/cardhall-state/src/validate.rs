//! Game-state integrity checks.
//!
//! `validate_snapshot` is a pure predicate over a snapshot: it never
//! raises, it only answers "is this state internally consistent". The
//! cache runs it on recovery and the coordinator runs it on reconnect;
//! a `false` answer routes to the hard-reset path.

use std::collections::HashSet;

use cardhall_protocol::{AuctionPhase, CardId, GameStatus};

use crate::GameSnapshot;

/// Checks the five integrity invariants of a game snapshot.
///
/// 1. At least 2 players are registered.
/// 2. Cards are neither lost nor duplicated: once leftover settlement
///    is done (`active`/`completed`), owned cards total exactly
///    `catalog_size − winner_count`; mid-deal, owned cards must at
///    least stay disjoint from the cards still flowing through the
///    auction.
/// 3. No card id is owned by more than one player.
/// 4. A live auction has positive time remaining (the card-on-block
///    invariant is carried by the `AuctionPhase::Active` shape itself).
/// 5. Once set up, the game's status is one of the non-`waiting`
///    values; a `waiting` game must carry no decks and no ownership.
pub fn validate_snapshot(snapshot: &GameSnapshot, catalog_size: usize) -> bool {
    check_players(snapshot)
        && check_card_accounting(snapshot, catalog_size)
        && check_unique_ownership(snapshot)
        && check_auction(snapshot)
        && check_lifecycle(snapshot)
}

fn check_players(snapshot: &GameSnapshot) -> bool {
    snapshot.players.len() >= 2
}

fn check_card_accounting(snapshot: &GameSnapshot, catalog_size: usize) -> bool {
    let game = &snapshot.game;
    let expected = catalog_size.saturating_sub(usize::from(game.winner_count));

    match game.status {
        GameStatus::Active | GameStatus::Completed => snapshot.cards_owned() == expected,
        GameStatus::Dealing => {
            // Settlement still in flight: owned cards and auction cards
            // must be disjoint, and together never exceed the target.
            let owned: HashSet<CardId> = snapshot
                .hands
                .iter()
                .flat_map(|h| h.cards.iter().map(|c| c.id))
                .collect();
            let in_auction: Vec<CardId> = match &game.auction {
                AuctionPhase::Active { current_card, remaining, unsold, .. } => {
                    std::iter::once(current_card.id)
                        .chain(remaining.iter().map(|c| c.id))
                        .chain(unsold.iter().map(|c| c.id))
                        .collect()
                }
                _ => Vec::new(),
            };
            in_auction.iter().all(|id| !owned.contains(id))
                && owned.len() + in_auction.len() <= expected
        }
        GameStatus::Waiting => snapshot.cards_owned() == 0,
    }
}

fn check_unique_ownership(snapshot: &GameSnapshot) -> bool {
    let mut seen = HashSet::new();
    snapshot
        .hands
        .iter()
        .flat_map(|h| h.cards.iter())
        .all(|card| seen.insert(card.id))
}

fn check_auction(snapshot: &GameSnapshot) -> bool {
    match &snapshot.game.auction {
        AuctionPhase::Active { time_remaining_ms, current_card, remaining, .. } => {
            *time_remaining_ms > 0 && remaining.iter().all(|c| c.id != current_card.id)
        }
        _ => true,
    }
}

fn check_lifecycle(snapshot: &GameSnapshot) -> bool {
    let game = &snapshot.game;
    let set_up = game.winning_cards.is_some() || !game.deck1.is_empty();
    if set_up {
        game.status.has_started()
    } else {
        // Pre-setup: nothing may have leaked into decks or ownership.
        game.status == GameStatus::Waiting && game.deck2.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cardhall_protocol::{
        Card, Game, GameId, Player, PlayerHand, PlayerId, WinningCards,
    };
    use std::collections::VecDeque;

    fn card(id: u32) -> Card {
        Card {
            id: CardId(id),
            name: format!("card-{id}"),
            localized_name: format!("karte-{id}"),
            artwork: None,
        }
    }

    fn player(id: u64) -> Player {
        Player {
            id: PlayerId(id),
            nickname: format!("player-{id}"),
            joined_at_ms: 0,
        }
    }

    /// A consistent 10-card, 2-winner, 2-player snapshot in `active`
    /// status: 8 cards owned, 4 per player.
    fn valid_snapshot() -> GameSnapshot {
        let mut game = Game::new(GameId(1), "AB12", 50, 2, 100.0, 4);
        game.status = GameStatus::Active;
        game.winning_cards = Some(WinningCards {
            cards: vec![card(8), card(9)],
            prizes: vec![60.0, 40.0],
        });
        game.deck1 = (0..8).map(card).collect();
        game.auction = AuctionPhase::Completed;

        let hands = vec![
            PlayerHand {
                player_id: PlayerId(1),
                nickname: "player-1".into(),
                cards: (0..4).map(card).collect(),
            },
            PlayerHand {
                player_id: PlayerId(2),
                nickname: "player-2".into(),
                cards: (4..8).map(card).collect(),
            },
        ];
        GameSnapshot {
            game,
            players: vec![player(1), player(2)],
            hands,
        }
    }

    const CATALOG: usize = 10;

    #[test]
    fn test_validate_accepts_consistent_snapshot() {
        assert!(validate_snapshot(&valid_snapshot(), CATALOG));
    }

    #[test]
    fn test_validate_rejects_single_player() {
        let mut snap = valid_snapshot();
        snap.players.truncate(1);
        assert!(!validate_snapshot(&snap, CATALOG));
    }

    #[test]
    fn test_validate_rejects_lost_card() {
        let mut snap = valid_snapshot();
        snap.hands[0].cards.pop();
        assert!(!validate_snapshot(&snap, CATALOG), "7 owned, expected 8");
    }

    #[test]
    fn test_validate_rejects_duplicated_card() {
        let mut snap = valid_snapshot();
        // Player 2 also "owns" card 0 — total is right, uniqueness isn't.
        snap.hands[1].cards.pop();
        snap.hands[1].cards.push(card(0));
        assert!(!validate_snapshot(&snap, CATALOG));
    }

    #[test]
    fn test_validate_rejects_expired_auction_clock() {
        let mut snap = valid_snapshot();
        snap.game.status = GameStatus::Dealing;
        snap.hands[0].cards.clear();
        snap.hands[1].cards.clear();
        snap.game.auction = AuctionPhase::Active {
            current_card: card(0),
            current_bid: 0,
            highest_bidder: None,
            time_remaining_ms: 0,
            remaining: VecDeque::new(),
            unsold: Vec::new(),
        };
        assert!(!validate_snapshot(&snap, CATALOG));
    }

    #[test]
    fn test_validate_rejects_current_card_also_queued() {
        let mut snap = valid_snapshot();
        snap.game.status = GameStatus::Dealing;
        snap.hands[0].cards.clear();
        snap.hands[1].cards.clear();
        snap.game.auction = AuctionPhase::Active {
            current_card: card(0),
            current_bid: 0,
            highest_bidder: None,
            time_remaining_ms: 5_000,
            remaining: VecDeque::from([card(0)]),
            unsold: Vec::new(),
        };
        assert!(!validate_snapshot(&snap, CATALOG));
    }

    #[test]
    fn test_validate_rejects_set_up_game_claiming_waiting() {
        let mut snap = valid_snapshot();
        // Decks exist but status regressed to waiting without a reset
        // wiping ownership — corrupt.
        snap.game.status = GameStatus::Waiting;
        assert!(!validate_snapshot(&snap, CATALOG));
    }

    #[test]
    fn test_validate_accepts_fresh_lobby_game() {
        let game = Game::new(GameId(2), "CD34", 10, 2, 100.0, 4);
        let snap = GameSnapshot {
            game,
            players: vec![player(1), player(2)],
            hands: vec![
                PlayerHand {
                    player_id: PlayerId(1),
                    nickname: "player-1".into(),
                    cards: vec![],
                },
                PlayerHand {
                    player_id: PlayerId(2),
                    nickname: "player-2".into(),
                    cards: vec![],
                },
            ],
        };
        assert!(validate_snapshot(&snap, CATALOG));
    }

    #[test]
    fn test_validate_dealing_rejects_owned_card_still_in_auction() {
        let mut snap = valid_snapshot();
        snap.game.status = GameStatus::Dealing;
        // Card 3 is both owned by player 1 and queued for auction.
        snap.game.auction = AuctionPhase::Active {
            current_card: card(3),
            current_bid: 0,
            highest_bidder: None,
            time_remaining_ms: 5_000,
            remaining: VecDeque::new(),
            unsold: Vec::new(),
        };
        assert!(!validate_snapshot(&snap, CATALOG));
    }
}
