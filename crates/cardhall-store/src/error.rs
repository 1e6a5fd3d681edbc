//! Error types for the persistence port.

use cardhall_protocol::{CardId, GameId};

/// Errors surfaced by [`GameStore`](crate::GameStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The game does not exist.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// A game with this id already exists.
    #[error("game {0} already exists")]
    GameExists(GameId),

    /// The nickname is already taken within this game.
    #[error("nickname {0:?} already taken in this game")]
    NicknameTaken(String),

    /// The batch tried to assign a card that already has an owner in
    /// this game. The whole batch is rolled back.
    #[error("card {0} already assigned in this game")]
    CardAlreadyAssigned(CardId),

    /// The backing storage is unreachable or failed mid-operation.
    /// This is the infrastructure-failure case: logged, surfaced as a
    /// generic failure, and it must release the per-game queue.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
