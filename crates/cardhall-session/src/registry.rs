//! The session registry: every seated player across every game.
//!
//! One registry serves the whole process. It is plain data with no
//! internal locking; the coordinator that owns it serializes access
//! at a higher level, so a `HashMap` is all that's needed here.
//!
//! ```text
//! connect() ──→ disconnect() ──→ reconnect()
//!    │               │                │
//!    │               ▼                │
//!    │          expire_stale()        │
//!    ▼               │                ▼
//! [Connected]   [Disconnected]   [Connected]
//!                    │
//!                    ▼ (grace elapsed)
//!                [Expired] ──→ cleanup_expired()
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use cardhall_protocol::{GameId, PlayerId, SessionId};
use rand::Rng;

use crate::{Session, SessionConfig, SessionError, SessionState};

/// Registry of all live sessions, indexed by session id and by player.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    /// A player holds at most one session at a time; this index keeps
    /// lookups by player O(1). Kept in sync with `sessions`.
    by_player: HashMap<PlayerId, SessionId>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            by_player: HashMap::new(),
            config,
        }
    }

    /// Seats a player: mints a session id and records a `Connected`
    /// session. The id is returned to the client as its reconnection
    /// credential.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the player already holds
    /// a live session. A dead (disconnected or expired) session is
    /// replaced instead.
    pub fn connect(
        &mut self,
        game_id: GameId,
        player_id: PlayerId,
        nickname: &str,
    ) -> Result<&Session, SessionError> {
        if let Some(old_id) = self.by_player.get(&player_id) {
            let old = &self.sessions[old_id];
            if old.is_connected() {
                return Err(SessionError::AlreadyConnected(player_id));
            }
            let old_id = old_id.clone();
            self.sessions.remove(&old_id);
        }

        let id = mint_session_id(nickname);
        let session = Session {
            id: id.clone(),
            game_id,
            player_id,
            nickname: nickname.to_owned(),
            state: SessionState::Connected,
        };
        self.by_player.insert(player_id, id.clone());
        self.sessions.insert(id.clone(), session);

        tracing::info!(%game_id, %player_id, session_id = %id, "session opened");
        Ok(&self.sessions[&id])
    }

    /// Marks a session disconnected and starts its grace period. The
    /// seat survives; the player keeps their hand and may still win
    /// auctions they already lead.
    pub fn disconnect(&mut self, session_id: &SessionId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;

        session.state = SessionState::Disconnected {
            since: Instant::now(),
        };
        tracing::info!(session_id = %session_id, "session disconnected, grace period started");
        Ok(())
    }

    /// Resumes a dropped session by id.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — unknown id
    /// - [`SessionError::Expired`] — grace period elapsed
    /// - [`SessionError::AlreadyConnected`] — the session never dropped
    pub fn reconnect(&mut self, session_id: &SessionId) -> Result<&Session, SessionError> {
        let grace = Duration::from_secs(self.config.reconnect_grace_secs);
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;

        match &session.state {
            SessionState::Disconnected { since } => {
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    return Err(SessionError::Expired(session_id.clone()));
                }
                session.state = SessionState::Connected;
                tracing::info!(session_id = %session_id, "session resumed");
                Ok(&self.sessions[session_id])
            }
            SessionState::Connected => Err(SessionError::AlreadyConnected(session.player_id)),
            SessionState::Expired => Err(SessionError::Expired(session_id.clone())),
        }
    }

    /// Sweeps all sessions and expires those past the grace period.
    /// Returns a copy of each newly-expired session so the caller can
    /// announce the permanent departures to the affected games.
    pub fn expire_stale(&mut self) -> Vec<Session> {
        let grace = Duration::from_secs(self.config.reconnect_grace_secs);
        let mut expired = Vec::new();

        for session in self.sessions.values_mut() {
            if let SessionState::Disconnected { since } = &session.state {
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    tracing::info!(
                        session_id = %session.id,
                        game_id = %session.game_id,
                        "session expired, seat forfeited"
                    );
                    expired.push(session.clone());
                }
            }
        }

        expired
    }

    /// Removes expired sessions from both indices. Kept separate from
    /// `expire_stale` so callers can act on the expirations (remove
    /// the player from their game) before the record disappears.
    pub fn cleanup_expired(&mut self) {
        self.sessions.retain(|_, session| {
            if matches!(session.state, SessionState::Expired) {
                self.by_player.remove(&session.player_id);
                false
            } else {
                true
            }
        });
    }

    /// Removes a session outright (voluntary leave — no grace period).
    pub fn remove(&mut self, session_id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(session_id)?;
        self.by_player.remove(&session.player_id);
        Some(session)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn find_by_player(&self, player_id: PlayerId) -> Option<&Session> {
        self.by_player
            .get(&player_id)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Mints a session id: nickname, millisecond timestamp, and a random
/// hex suffix. The timestamp gives uniqueness across joins, the suffix
/// makes the id unguessable enough to serve as a resume credential.
fn mint_session_id(nickname: &str) -> SessionId {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let suffix: u64 = rand::rng().random();
    SessionId(format!("{nickname}-{now_ms}-{suffix:016x}"))
}

// =========================================================================
// Tests
// =========================================================================
