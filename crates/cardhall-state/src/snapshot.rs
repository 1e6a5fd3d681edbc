//! Point-in-time game snapshots.

use std::collections::HashMap;

use cardhall_protocol::{Card, CardId, Game, Player, PlayerHand};
use cardhall_store::StoredGame;

/// A composite of one game plus its resolved player → cards mapping.
///
/// Snapshots are what the cache stores, what the rollback history
/// holds, and what gets replayed to a reconnecting player. They are
/// always reconstructable from storage — losing the cache loses
/// nothing but a read.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub game: Game,
    /// Players in join order.
    pub players: Vec<Player>,
    /// One entry per player, empty hand included, in join order.
    pub hands: Vec<PlayerHand>,
}

impl GameSnapshot {
    /// Builds a snapshot from a joined store read, resolving ownership
    /// rows against the card catalog.
    ///
    /// Rows pointing at unknown card ids are dropped silently — the
    /// validator flags the count mismatch, which is the signal the
    /// reset path acts on.
    pub fn resolve(stored: StoredGame, catalog: &[Card]) -> Self {
        let by_id: HashMap<CardId, &Card> = catalog.iter().map(|c| (c.id, c)).collect();

        let hands = stored
            .players
            .iter()
            .map(|player| PlayerHand {
                player_id: player.id,
                nickname: player.nickname.clone(),
                cards: stored
                    .assignments
                    .iter()
                    .filter(|a| a.player_id == player.id)
                    .filter_map(|a| by_id.get(&a.card_id).map(|c| (*c).clone()))
                    .collect(),
            })
            .collect();

        Self {
            game: stored.game,
            players: stored.players,
            hands,
        }
    }

    /// Total number of cards owned by players in this snapshot.
    pub fn cards_owned(&self) -> usize {
        self.hands.iter().map(|h| h.cards.len()).sum()
    }
}
