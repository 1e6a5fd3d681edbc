//! In-memory [`GameStore`] implementation.
//!
//! Backs tests and development servers. All tables live behind one
//! async mutex, which makes every method atomic — in particular
//! `commit_assignments` validates the whole batch before writing
//! anything, giving the same all-or-nothing behavior a database
//! transaction would.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cardhall_protocol::{Card, CardAssignment, Game, GameId, Player, PlayerId};
use tokio::sync::Mutex;

use crate::{GameStore, StoreError, StoredGame};

#[derive(Default)]
struct Tables {
    cards: Vec<Card>,
    games: HashMap<GameId, Game>,
    players: HashMap<GameId, Vec<Player>>,
    assignments: HashMap<GameId, Vec<CardAssignment>>,
}

/// An in-memory store. Cloning produces another handle to the same
/// tables (the inner state is shared through an `Arc`).
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    /// When set, every operation fails with `Unavailable`. Lets tests
    /// exercise the infrastructure-failure paths.
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store with the given card catalog.
    pub fn with_catalog(cards: Vec<Card>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables {
                cards,
                ..Tables::default()
            })),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulates the backing storage going down (or back up).
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store marked down".into()))
        } else {
            Ok(())
        }
    }
}

impl GameStore for MemoryStore {
    async fn list_all_cards(&self) -> Result<Vec<Card>, StoreError> {
        self.check_up()?;
        Ok(self.tables.lock().await.cards.clone())
    }

    async fn create_game(&self, game: Game) -> Result<(), StoreError> {
        self.check_up()?;
        let mut tables = self.tables.lock().await;
        if tables.games.contains_key(&game.id) {
            return Err(StoreError::GameExists(game.id));
        }
        let id = game.id;
        tables.games.insert(id, game);
        tables.players.insert(id, Vec::new());
        tables.assignments.insert(id, Vec::new());
        tracing::debug!(game_id = %id, "game created");
        Ok(())
    }

    async fn load_game(&self, game_id: GameId) -> Result<StoredGame, StoreError> {
        self.check_up()?;
        let tables = self.tables.lock().await;
        let game = tables
            .games
            .get(&game_id)
            .cloned()
            .ok_or(StoreError::GameNotFound(game_id))?;
        Ok(StoredGame {
            game,
            players: tables.players.get(&game_id).cloned().unwrap_or_default(),
            assignments: tables.assignments.get(&game_id).cloned().unwrap_or_default(),
        })
    }

    async fn update_game(&self, game: &Game) -> Result<(), StoreError> {
        self.check_up()?;
        let mut tables = self.tables.lock().await;
        let slot = tables
            .games
            .get_mut(&game.id)
            .ok_or(StoreError::GameNotFound(game.id))?;
        *slot = game.clone();
        Ok(())
    }

    async fn add_player(&self, game_id: GameId, player: Player) -> Result<(), StoreError> {
        self.check_up()?;
        let mut tables = self.tables.lock().await;
        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::GameNotFound(game_id));
        }
        let roster = tables.players.entry(game_id).or_default();
        if roster.iter().any(|p| p.nickname == player.nickname) {
            return Err(StoreError::NicknameTaken(player.nickname));
        }
        roster.push(player);
        Ok(())
    }

    async fn remove_player(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<(), StoreError> {
        self.check_up()?;
        let mut tables = self.tables.lock().await;
        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::GameNotFound(game_id));
        }
        if let Some(roster) = tables.players.get_mut(&game_id) {
            roster.retain(|p| p.id != player_id);
        }
        Ok(())
    }

    async fn commit_assignments(
        &self,
        game: &Game,
        assignments: Vec<CardAssignment>,
    ) -> Result<(), StoreError> {
        self.check_up()?;
        let mut tables = self.tables.lock().await;
        if !tables.games.contains_key(&game.id) {
            return Err(StoreError::GameNotFound(game.id));
        }

        // Validate the whole batch before touching anything, so a bad
        // row can't leave a partial write behind.
        let existing = tables.assignments.entry(game.id).or_default();
        for row in &assignments {
            let taken = existing.iter().any(|a| a.card_id == row.card_id)
                || assignments
                    .iter()
                    .filter(|a| a.card_id == row.card_id)
                    .count()
                    > 1;
            if taken {
                return Err(StoreError::CardAlreadyAssigned(row.card_id));
            }
        }

        existing.extend(assignments);
        let id = game.id;
        tables.games.insert(id, game.clone());
        tracing::debug!(game_id = %id, "assignment batch committed");
        Ok(())
    }

    async fn clear_assignments(&self, game_id: GameId) -> Result<(), StoreError> {
        self.check_up()?;
        let mut tables = self.tables.lock().await;
        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::GameNotFound(game_id));
        }
        tables.assignments.insert(game_id, Vec::new());
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
