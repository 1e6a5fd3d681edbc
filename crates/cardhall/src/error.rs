//! Unified error type for the Cardhall coordinator.

use cardhall_engine::EngineError;
use cardhall_protocol::GameId;
use cardhall_session::SessionError;
use cardhall_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// Callers of the coordinator deal with this single type instead of
/// importing errors from each sub-crate; the `#[from]` impls let `?`
/// convert sub-crate errors automatically. The two extra variants
/// cover failures that only exist at the coordination layer.
#[derive(Debug, thiserror::Error)]
pub enum CardhallError {
    /// A rule violation from the engine (invalid state, bad bid,
    /// impossible setup).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A persistence error (not found, conflict, storage unreachable).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session lifecycle error (unknown id, expired, duplicate).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The validator found the game's state corrupt. The game has been
    /// hard-reset to the lobby by the time this is reported.
    #[error("game {0} failed integrity validation and was reset")]
    IntegrityFailure(GameId),

    /// The game's actor task is gone (game destroyed or crashed).
    #[error("game {0} is no longer running")]
    GameClosed(GameId),
}
