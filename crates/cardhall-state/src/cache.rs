//! The authoritative game-state cache.
//!
//! A `StateCache` owns cached snapshots and their bounded rollback
//! history, keyed by game id. It is an owned registry passed
//! explicitly to whoever needs it, not an ambient global, and it is
//! only ever touched from the per-game serialized paths, so no
//! internal locking is needed beyond the store's own.
//!
//! The cache is read-through: a miss rebuilds the snapshot from
//! persisted storage, which remains the tie-breaking source of truth
//! whenever the cache is absent or invalidated.

use std::collections::{HashMap, VecDeque};

use cardhall_protocol::{AuctionPhase, CardAssignment, GameId, GameStatus};
use cardhall_store::{GameStore, StoreError};

use crate::{validate_snapshot, GameSnapshot};

/// How many snapshots of history each game keeps for rollback.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Snapshot cache with bounded per-game rollback history.
pub struct StateCache<S: GameStore> {
    store: S,
    snapshots: HashMap<GameId, GameSnapshot>,
    history: HashMap<GameId, VecDeque<GameSnapshot>>,
    depth: usize,
}

impl<S: GameStore> StateCache<S> {
    /// Creates a cache over the given store with the default history
    /// depth.
    pub fn new(store: S) -> Self {
        Self::with_depth(store, DEFAULT_HISTORY_DEPTH)
    }

    /// Creates a cache with a custom history depth (minimum 1).
    pub fn with_depth(store: S, depth: usize) -> Self {
        Self {
            store,
            snapshots: HashMap::new(),
            history: HashMap::new(),
            depth: depth.max(1),
        }
    }

    /// Recomputes the snapshot from persisted storage, caches it, and
    /// appends it to the game's history (evicting the oldest entry
    /// once the history exceeds its depth).
    ///
    /// Call after every state-changing operation.
    pub async fn save(&mut self, game_id: GameId) -> Result<GameSnapshot, StoreError> {
        let stored = self.store.load_game(game_id).await?;
        let catalog = self.store.list_all_cards().await?;
        let snapshot = GameSnapshot::resolve(stored, &catalog);

        self.snapshots.insert(game_id, snapshot.clone());
        let history = self.history.entry(game_id).or_default();
        history.push_back(snapshot.clone());
        while history.len() > self.depth {
            history.pop_front();
        }

        tracing::debug!(%game_id, history = history.len(), "snapshot saved");
        Ok(snapshot)
    }

    /// Returns the cached snapshot, rebuilding it from storage on a
    /// miss.
    ///
    /// # Errors
    /// [`StoreError::GameNotFound`] if the underlying game is gone.
    pub async fn recover(&mut self, game_id: GameId) -> Result<GameSnapshot, StoreError> {
        if let Some(snapshot) = self.snapshots.get(&game_id) {
            return Ok(snapshot.clone());
        }
        self.save(game_id).await
    }

    /// Runs the integrity checks against the (possibly rebuilt)
    /// snapshot. Returns the verdict; only infrastructure failures
    /// raise.
    pub async fn validate(&mut self, game_id: GameId) -> Result<bool, StoreError> {
        let snapshot = self.recover(game_id).await?;
        let catalog_size = self.store.list_all_cards().await?.len();
        Ok(validate_snapshot(&snapshot, catalog_size))
    }

    /// Validates the game and hard-resets it if corrupt.
    ///
    /// The reset is the only path that regresses `status`: back to
    /// `waiting`, decks/auction/turn/reveals cleared, every ownership
    /// row deleted, cache entry and history evicted. Returns `true`
    /// when a reset was performed.
    pub async fn handle_state_error(&mut self, game_id: GameId) -> Result<bool, StoreError> {
        if self.validate(game_id).await? {
            return Ok(false);
        }

        tracing::warn!(%game_id, "state validation failed, hard-resetting game");

        let mut game = self.store.load_game(game_id).await?.game;
        game.status = GameStatus::Waiting;
        game.deck1.clear();
        game.deck2.clear();
        game.winning_cards = None;
        game.auction = AuctionPhase::Inactive;
        game.revealed_cards.clear();
        game.current_turn = 0;

        self.store.update_game(&game).await?;
        self.store.clear_assignments(game_id).await?;
        self.evict(game_id);
        Ok(true)
    }

    /// Rolls the game back to the previous snapshot in its history.
    ///
    /// Pops the current entry and re-persists the prior snapshot's
    /// mutable fields (status, turn, auction, decks, winning cards)
    /// together with its ownership rows. A no-op returning `None` when
    /// fewer than two entries exist — there is nothing to roll back to.
    pub async fn rollback_to_last(
        &mut self,
        game_id: GameId,
    ) -> Result<Option<GameSnapshot>, StoreError> {
        let history = match self.history.get_mut(&game_id) {
            Some(h) if h.len() >= 2 => h,
            _ => return Ok(None),
        };

        history.pop_back();
        let previous = history
            .back()
            .cloned()
            .expect("history still has at least one entry");

        // Re-persist the prior snapshot's mutable fields on top of the
        // current row. Players stay; ownership is rewound to match the
        // snapshot — a row committed after it (an auction award) would
        // otherwise collide with the card put back on the block.
        let mut game = self.store.load_game(game_id).await?.game;
        game.status = previous.game.status;
        game.current_turn = previous.game.current_turn;
        game.auction = previous.game.auction.clone();
        game.deck1 = previous.game.deck1.clone();
        game.deck2 = previous.game.deck2.clone();
        game.winning_cards = previous.game.winning_cards.clone();
        game.revealed_cards = previous.game.revealed_cards.clone();

        let rows: Vec<CardAssignment> = previous
            .hands
            .iter()
            .flat_map(|hand| {
                hand.cards.iter().map(|card| CardAssignment {
                    game_id,
                    player_id: hand.player_id,
                    card_id: card.id,
                })
            })
            .collect();
        self.store.clear_assignments(game_id).await?;
        self.store.commit_assignments(&game, rows).await?;

        self.snapshots.insert(game_id, previous.clone());
        tracing::info!(%game_id, "rolled back to previous snapshot");
        Ok(Some(previous))
    }

    /// Drops the cache entry and history for a game (called when a
    /// game completes or is reset).
    pub fn evict(&mut self, game_id: GameId) {
        self.snapshots.remove(&game_id);
        self.history.remove(&game_id);
    }

    /// Read access to the underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of history entries held for a game (test/inspection).
    pub fn history_len(&self, game_id: GameId) -> usize {
        self.history.get(&game_id).map_or(0, VecDeque::len)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cardhall_protocol::{Card, CardAssignment, CardId, Game, Player, PlayerId};
    use cardhall_store::MemoryStore;

    fn card(id: u32) -> Card {
        Card {
            id: CardId(id),
            name: format!("card-{id}"),
            localized_name: format!("karte-{id}"),
            artwork: None,
        }
    }

    fn catalog(n: u32) -> Vec<Card> {
        (0..n).map(card).collect()
    }

    fn player(id: u64) -> Player {
        Player {
            id: PlayerId(id),
            nickname: format!("player-{id}"),
            joined_at_ms: 0,
        }
    }

    /// Store with a 10-card catalog and a 2-winner, 2-player game.
    async fn seeded() -> (MemoryStore, GameId) {
        let store = MemoryStore::with_catalog(catalog(10));
        let game = Game::new(GameId(1), "AB12", 50, 2, 100.0, 4);
        store.create_game(game).await.unwrap();
        store.add_player(GameId(1), player(1)).await.unwrap();
        store.add_player(GameId(1), player(2)).await.unwrap();
        (store, GameId(1))
    }

    /// Moves the seeded game into a fully-distributed `active` state:
    /// cards 0–3 to player 1, cards 4–7 to player 2, 8–9 winners.
    async fn activate(store: &MemoryStore, game_id: GameId) {
        let mut game = store.load_game(game_id).await.unwrap().game;
        game.status = GameStatus::Active;
        game.winning_cards = Some(cardhall_protocol::WinningCards {
            cards: vec![card(8), card(9)],
            prizes: vec![60.0, 40.0],
        });
        game.deck1 = (0..8).map(card).collect();
        game.auction = AuctionPhase::Completed;

        let rows: Vec<CardAssignment> = (0..8)
            .map(|i| CardAssignment {
                game_id,
                player_id: if i < 4 { PlayerId(1) } else { PlayerId(2) },
                card_id: CardId(i),
            })
            .collect();
        store.commit_assignments(&game, rows).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_builds_resolved_snapshot() {
        let (store, game_id) = seeded().await;
        activate(&store, game_id).await;
        let mut cache = StateCache::new(store);

        let snapshot = cache.save(game_id).await.unwrap();

        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.cards_owned(), 8);
        assert_eq!(snapshot.hands[0].cards.len(), 4);
    }

    #[tokio::test]
    async fn test_recover_misses_rebuild_from_store() {
        let (store, game_id) = seeded().await;
        let mut cache = StateCache::new(store);

        // No prior save — recover must read through to storage.
        let snapshot = cache.recover(game_id).await.unwrap();
        assert_eq!(snapshot.game.id, game_id);
        // And the read-through populated the cache + history.
        assert_eq!(cache.history_len(game_id), 1);
    }

    #[tokio::test]
    async fn test_recover_unknown_game_fails() {
        let (store, _) = seeded().await;
        let mut cache = StateCache::new(store);
        let result = cache.recover(GameId(404)).await;
        assert!(matches!(result, Err(StoreError::GameNotFound(_))));
    }

    #[tokio::test]
    async fn test_history_evicts_oldest_beyond_depth() {
        let (store, game_id) = seeded().await;
        let mut cache = StateCache::with_depth(store, 3);

        for _ in 0..5 {
            cache.save(game_id).await.unwrap();
        }

        assert_eq!(cache.history_len(game_id), 3);
    }

    #[tokio::test]
    async fn test_validate_passes_consistent_game() {
        let (store, game_id) = seeded().await;
        activate(&store, game_id).await;
        let mut cache = StateCache::new(store);

        assert!(cache.validate(game_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_fails_on_missing_cards() {
        let (store, game_id) = seeded().await;
        activate(&store, game_id).await;
        // Corrupt: wipe ownership while the game claims to be active.
        store.clear_assignments(game_id).await.unwrap();
        let mut cache = StateCache::new(store);

        assert!(!cache.validate(game_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_handle_state_error_valid_game_is_untouched() {
        let (store, game_id) = seeded().await;
        activate(&store, game_id).await;
        let mut cache = StateCache::new(store.clone());

        let reset = cache.handle_state_error(game_id).await.unwrap();

        assert!(!reset);
        let stored = store.load_game(game_id).await.unwrap();
        assert_eq!(stored.game.status, GameStatus::Active);
        assert_eq!(stored.assignments.len(), 8);
    }

    #[tokio::test]
    async fn test_handle_state_error_resets_corrupt_game() {
        let (store, game_id) = seeded().await;
        activate(&store, game_id).await;
        store.clear_assignments(game_id).await.unwrap();
        let mut cache = StateCache::new(store.clone());

        let reset = cache.handle_state_error(game_id).await.unwrap();

        assert!(reset);
        let stored = store.load_game(game_id).await.unwrap();
        assert_eq!(stored.game.status, GameStatus::Waiting);
        assert!(stored.game.deck1.is_empty());
        assert!(stored.game.deck2.is_empty());
        assert!(stored.game.winning_cards.is_none());
        assert_eq!(stored.game.auction, AuctionPhase::Inactive);
        assert!(stored.assignments.is_empty());
        assert_eq!(cache.history_len(game_id), 0, "cache entry evicted");
    }

    #[tokio::test]
    async fn test_rollback_with_single_entry_is_noop() {
        let (store, game_id) = seeded().await;
        let mut cache = StateCache::new(store);
        cache.save(game_id).await.unwrap();

        let result = cache.rollback_to_last(game_id).await.unwrap();
        assert!(result.is_none());
        assert_eq!(cache.history_len(game_id), 1);
    }

    #[tokio::test]
    async fn test_rollback_with_no_history_is_noop() {
        let (store, game_id) = seeded().await;
        let mut cache = StateCache::new(store);

        let result = cache.rollback_to_last(game_id).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_rollback_restores_previous_snapshot() {
        let (store, game_id) = seeded().await;
        let mut cache = StateCache::new(store.clone());
        cache.save(game_id).await.unwrap(); // waiting-state snapshot

        // Mutate: bump the turn counter and advance the status.
        activate(&store, game_id).await;
        let mut game = store.load_game(game_id).await.unwrap().game;
        game.current_turn = 3;
        store.update_game(&game).await.unwrap();
        cache.save(game_id).await.unwrap(); // active-state snapshot

        let previous = cache.rollback_to_last(game_id).await.unwrap().unwrap();

        assert_eq!(previous.game.status, GameStatus::Waiting);
        let stored = store.load_game(game_id).await.unwrap();
        assert_eq!(stored.game.status, GameStatus::Waiting);
        assert_eq!(stored.game.current_turn, 0);
        assert!(stored.game.winning_cards.is_none());
        assert!(
            stored.assignments.is_empty(),
            "ownership rewinds with the snapshot"
        );
    }

    #[tokio::test]
    async fn test_rollback_removes_rows_committed_after_snapshot() {
        let (store, game_id) = seeded().await;
        activate(&store, game_id).await;
        let mut cache = StateCache::new(store.clone());
        cache.save(game_id).await.unwrap(); // 8 cards owned

        // An award lands one more row on top of the snapshot.
        let game = store.load_game(game_id).await.unwrap().game;
        let row = CardAssignment {
            game_id,
            player_id: PlayerId(1),
            card_id: CardId(8),
        };
        store.commit_assignments(&game, vec![row]).await.unwrap();
        cache.save(game_id).await.unwrap(); // 9 cards owned

        let previous = cache.rollback_to_last(game_id).await.unwrap().unwrap();

        // The post-snapshot row is gone, so the card can be awarded
        // again without colliding with its stale owner.
        assert_eq!(previous.cards_owned(), 8);
        let stored = store.load_game(game_id).await.unwrap();
        assert_eq!(stored.assignments.len(), 8);
        assert!(stored.assignments.iter().all(|a| a.card_id != CardId(8)));
    }
}
