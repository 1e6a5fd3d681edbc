//! # Cardhall
//!
//! Server core for a multiplayer card-auction game: players join a
//! room, receive dealt hands, bid on leftover cards in a timed
//! auction, and reveal cards that pay out of a prize pool.
//!
//! This crate is the coordination layer over the workspace:
//!
//! ```text
//! GameManager ── sessions, routing ──► GameHandle ──► GameActor (one task per game)
//!                                                        │
//!                     cardhall-engine (pure rules) ◄─────┤
//!                     cardhall-state  (cache/validate) ◄─┤
//!                     cardhall-store  (persistence) ◄────┘
//! ```
//!
//! Each game runs in its own actor task; all of a game's mutations —
//! client commands and the auction countdown alike — are serialized
//! through that actor's channel. Transport framing is a collaborator:
//! clients are just per-player [`PlayerSender`] channels carrying
//! [`ServerEvent`](cardhall_protocol::ServerEvent)s.

pub mod actor;
pub mod manager;
pub mod timer;

mod error;

pub use actor::{GameConfig, GameHandle, PlayerSender};
pub use error::CardhallError;
pub use manager::{GameManager, GameSettings};

/// Convenience re-exports for embedding the Cardhall core.
pub mod prelude {
    pub use crate::{CardhallError, GameConfig, GameHandle, GameManager, GameSettings, PlayerSender};
    pub use cardhall_engine::{DEFAULT_BID_WINDOW_MS, EngineError};
    pub use cardhall_protocol::{
        AuctionPhase, Card, CardId, ClientRequest, Game, GameId, GameStatus, Player, PlayerHand,
        PlayerId, Recipient, ServerEvent, SessionId, Visibility,
    };
    pub use cardhall_session::SessionConfig;
    pub use cardhall_state::GameSnapshot;
    pub use cardhall_store::{GameStore, MemoryStore, StoreError};
}
