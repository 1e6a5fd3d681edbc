//! Error types for the game engine.

use cardhall_protocol::GameId;

/// Errors from deck preparation, dealing, and auction transitions.
///
/// All of these are expected user-facing outcomes — they are reported
/// to the originating connection and never crash the process.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The operation is not legal for the game's current status or
    /// auction phase. Also covers stale bids that lose the race
    /// against timer-driven settlement.
    #[error("invalid state for game {game}: {reason}")]
    InvalidState { game: GameId, reason: String },

    /// A bid that is not a strict increase over the current bid.
    #[error("bid of {bid} does not beat the current bid of {current}")]
    InvalidBid { bid: u64, current: u64 },

    /// The winner count is outside the supported 1–7 range, so no
    /// prize-split row exists for it.
    #[error("winner count {0} outside the supported range 1-7")]
    WinnerCountOutOfRange(u8),

    /// The catalog is too small to draw winners and still deal hands.
    #[error("catalog of {catalog} cards is too small, need at least {required}")]
    CatalogTooSmall { catalog: usize, required: usize },

    /// Cards cannot be dealt to an empty player list.
    #[error("cannot deal cards to an empty player list")]
    NoPlayers,
}
