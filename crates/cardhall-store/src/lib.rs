//! Persistence port for Cardhall.
//!
//! The core never talks to a database directly — it talks to the
//! [`GameStore`] trait. Production wires in a real database adapter,
//! tests and development servers use the bundled [`MemoryStore`], and
//! no engine code changes either way.
//!
//! The trait surface is deliberately narrow: catalog reads, game CRUD
//! with players and ownership eagerly joined, atomic assignment
//! batches, and the ownership wipe used by hard resets.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use std::future::Future;

use cardhall_protocol::{Card, CardAssignment, Game, GameId, Player};

/// A point-in-time read of one game with players and ownership joined.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGame {
    pub game: Game,
    /// Players in join order. Hand dealing and turn order follow this.
    pub players: Vec<Player>,
    pub assignments: Vec<CardAssignment>,
}

/// The persistence contract the game core needs.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so a store handle can be shared across the
/// per-game actor tasks. Every method returns a `Send` future for the
/// same reason. Implementations are expected to be cheaply cloneable
/// handles (connection pool, `Arc` over tables, ...).
pub trait GameStore: Send + Sync + 'static {
    /// The full card catalog. Order is not significant — the engine
    /// shuffles.
    fn list_all_cards(&self) -> impl Future<Output = Result<Vec<Card>, StoreError>> + Send;

    /// Creates a game row. Fails if the id is already taken.
    fn create_game(&self, game: Game) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Loads a game with its players and ownership rows joined.
    fn load_game(
        &self,
        game_id: GameId,
    ) -> impl Future<Output = Result<StoredGame, StoreError>> + Send;

    /// Writes back the mutable fields of a game aggregate.
    fn update_game(&self, game: &Game) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Registers a player in a game. Nicknames are unique per game.
    fn add_player(
        &self,
        game_id: GameId,
        player: Player,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a player from a game (explicit leave, not disconnect).
    fn remove_player(
        &self,
        game_id: GameId,
        player_id: cardhall_protocol::PlayerId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Atomically writes a batch of ownership rows together with the
    /// game update that accompanies them (status/auction transition).
    /// Either everything lands or nothing does; a card id that already
    /// has an owner in this game fails the whole batch.
    fn commit_assignments(
        &self,
        game: &Game,
        assignments: Vec<CardAssignment>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes every ownership row for a game. Used by the hard reset.
    fn clear_assignments(
        &self,
        game_id: GameId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
