//! Session types: the server's record of one seated player.

use std::time::Instant;

use cardhall_protocol::{GameId, PlayerId, SessionId};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timeouts for the session layer.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long (in seconds) a disconnected player has to reconnect
    /// before their seat is permanently forfeited.
    ///
    /// Default: 60 seconds. Set to 0 to disable reconnection.
    pub reconnect_grace_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle state of a session.
///
/// ```text
///   Connected ──(disconnect)──→ Disconnected ──(grace elapsed)──→ Expired
///       ↑                            │
///       └────────(reconnect)─────────┘
/// ```
///
/// `Disconnected` carries the monotonic instant of the drop so the
/// registry can tell when the grace period runs out.
#[derive(Debug, Clone)]
pub enum SessionState {
    Connected,
    Disconnected { since: Instant },
    Expired,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One player's seat in one game.
///
/// Created on join; the session id doubles as the reconnection
/// credential, so a client that drops mid-game presents it to resume
/// the same seat. Dies when the player leaves on purpose or the grace
/// period elapses.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub nickname: String,
    pub state: SessionState,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected)
    }
}
