//! Game manager: creates games, routes sessions to their actors, and
//! sweeps expired seats.
//!
//! The manager is the single entry point for connections. It owns the
//! process-wide [`SessionRegistry`] and one [`GameHandle`] per running
//! game; everything game-specific is delegated to the game's actor so
//! the per-game single-writer discipline is never bypassed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cardhall_protocol::{ClientRequest, Game, GameId, Player, PlayerId, SessionId, Visibility};
use cardhall_session::{SessionConfig, SessionError, SessionRegistry};
use cardhall_store::{GameStore, StoreError};

use crate::actor::{GameConfig, GameHandle, PlayerSender, spawn_game};
use crate::error::CardhallError;

/// Counters for minting unique game and player ids.
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Command channel size for game actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Settings for a game being created.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub join_code: String,
    pub visibility: Visibility,
    pub entrance_fee: u64,
    pub winner_count: u8,
    pub prize_pool: f64,
    pub max_players: u8,
}

/// Routes every connection-level operation to the right game actor.
pub struct GameManager<S: GameStore + Clone> {
    store: S,
    games: HashMap<GameId, GameHandle>,
    sessions: SessionRegistry,
    game_config: GameConfig,
}

impl<S: GameStore + Clone> GameManager<S> {
    pub fn new(store: S, session_config: SessionConfig, game_config: GameConfig) -> Self {
        Self {
            store,
            games: HashMap::new(),
            sessions: SessionRegistry::new(session_config),
            game_config,
        }
    }

    /// Creates a game row and spawns its actor.
    pub async fn create_game(&mut self, settings: GameSettings) -> Result<GameId, CardhallError> {
        let game_id = GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed));
        let mut game = Game::new(
            game_id,
            settings.join_code,
            settings.entrance_fee,
            settings.winner_count,
            settings.prize_pool,
            settings.max_players,
        );
        game.visibility = settings.visibility;
        self.store.create_game(game).await?;

        let handle = spawn_game(
            game_id,
            self.store.clone(),
            self.game_config.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.games.insert(game_id, handle);
        tracing::info!(%game_id, "game created");
        Ok(game_id)
    }

    /// Spawns an actor for a game that already exists in storage — the
    /// recovery path after a process restart. Sessions do not survive
    /// a restart; participants come back through [`Self::connect`].
    pub async fn open_game(&mut self, game_id: GameId) -> Result<(), CardhallError> {
        self.store.load_game(game_id).await?;
        let handle = spawn_game(
            game_id,
            self.store.clone(),
            self.game_config.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.games.insert(game_id, handle);
        tracing::info!(%game_id, "game reopened from storage");
        Ok(())
    }

    /// Seats a connecting participant, distinguishing fresh joins from
    /// reconnects.
    ///
    /// A presented session id that still maps to a live session in the
    /// same game resumes that seat: no join broadcast, state replayed
    /// to the returning player only. Anything else — no id, unknown
    /// id, expired id — is a fresh join under a newly minted session.
    ///
    /// Returns the session id the client must present to reconnect.
    pub async fn connect(
        &mut self,
        game_id: GameId,
        nickname: &str,
        session_id: Option<SessionId>,
        sender: PlayerSender,
    ) -> Result<SessionId, CardhallError> {
        let handle = self.handle_for(game_id)?.clone();

        if let Some(sid) = session_id {
            let claims_this_game = self
                .sessions
                .get(&sid)
                .is_some_and(|s| s.game_id == game_id);
            if claims_this_game {
                match self.sessions.reconnect(&sid) {
                    Ok(session) => {
                        let player_id = session.player_id;
                        handle.reconnect(player_id, sender).await?;
                        tracing::info!(%game_id, %player_id, "participant reconnected");
                        return Ok(sid);
                    }
                    // Grace period ran out between disconnect and now:
                    // fall through to a fresh join.
                    Err(SessionError::Expired(_)) => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }

        let player_id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
        let player = Player {
            id: player_id,
            nickname: nickname.to_owned(),
            joined_at_ms: now_ms(),
        };
        handle.join(player, sender).await?;
        let session = self.sessions.connect(game_id, player_id, nickname)?;
        tracing::info!(%game_id, %player_id, "participant joined");
        Ok(session.id.clone())
    }

    /// Routes a client request from a seated session to its game.
    pub async fn request(
        &mut self,
        session_id: &SessionId,
        request: ClientRequest,
    ) -> Result<(), CardhallError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;
        let (game_id, player_id) = (session.game_id, session.player_id);
        let handle = self.handle_for(game_id)?.clone();

        match request {
            ClientRequest::StartGame => handle.start(player_id).await,
            ClientRequest::ReadyToStart => handle.ready(player_id).await,
            ClientRequest::PlaceBid { amount } => handle.place_bid(player_id, amount).await,
            ClientRequest::RevealCard { card_id } => handle.reveal_card(player_id, card_id).await,
            ClientRequest::LeaveGame => self.leave(session_id).await,
        }
    }

    /// Transient connection drop: the seat enters its grace period and
    /// the room hears a non-permanent departure notice.
    pub async fn disconnect(&mut self, session_id: &SessionId) -> Result<(), CardhallError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;
        let (game_id, player_id) = (session.game_id, session.player_id);

        self.sessions.disconnect(session_id)?;
        if let Some(handle) = self.games.get(&game_id) {
            handle.disconnect(player_id).await?;
        }
        Ok(())
    }

    /// Voluntary leave: the session dies immediately, no grace period.
    pub async fn leave(&mut self, session_id: &SessionId) -> Result<(), CardhallError> {
        let session = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;
        if let Some(handle) = self.games.get(&session.game_id) {
            handle.leave(session.player_id).await?;
        }
        Ok(())
    }

    /// Expires sessions whose grace period ran out and announces each
    /// as a permanent departure to its game. Call periodically.
    pub async fn sweep_sessions(&mut self) {
        for session in self.sessions.expire_stale() {
            if let Some(handle) = self.games.get(&session.game_id) {
                if let Err(err) = handle.leave(session.player_id).await {
                    tracing::warn!(
                        game_id = %session.game_id,
                        player_id = %session.player_id,
                        %err,
                        "failed to announce expired session"
                    );
                }
            }
        }
        self.sessions.cleanup_expired();
    }

    /// Stops a game's actor and forgets its handle.
    pub async fn destroy_game(&mut self, game_id: GameId) -> Result<(), CardhallError> {
        let handle = self
            .games
            .remove(&game_id)
            .ok_or(CardhallError::Store(StoreError::GameNotFound(game_id)))?;
        let _ = handle.shutdown().await;
        tracing::info!(%game_id, "game destroyed");
        Ok(())
    }

    /// Handle lookup for direct actor access (snapshots, tests).
    pub fn game(&self, game_id: GameId) -> Option<&GameHandle> {
        self.games.get(&game_id)
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn handle_for(&self, game_id: GameId) -> Result<&GameHandle, CardhallError> {
        self.games
            .get(&game_id)
            .ok_or(CardhallError::Store(StoreError::GameNotFound(game_id)))
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
