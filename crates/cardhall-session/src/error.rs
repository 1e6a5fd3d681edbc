//! Error types for the session layer.

use cardhall_protocol::{PlayerId, SessionId};

/// Errors raised by session lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists under the given id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session's reconnection grace period has elapsed; the seat
    /// is forfeited and the player must join fresh.
    #[error("session {0} expired")]
    Expired(SessionId),

    /// The player already holds a live session; one seat per player.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),
}
