//! Data model and client-facing types for Cardhall.
//!
//! This is the leaf crate every other layer depends on. It defines:
//!
//! - identity newtypes ([`GameId`], [`PlayerId`], [`CardId`], [`SessionId`])
//! - the [`Game`] aggregate and its [`AuctionPhase`] state machine
//! - ownership rows ([`CardAssignment`]) and resolved hands ([`PlayerHand`])
//! - the event/request vocabulary of the realtime interface
//!   ([`ServerEvent`], [`ClientRequest`], [`Recipient`])
//!
//! No logic lives here — the engine, store, and coordinator crates all
//! speak in these types.

mod events;
mod types;

pub use events::{ClientRequest, ServerEvent};
pub use types::{
    AuctionPhase, Card, CardAssignment, CardId, Game, GameId, GameStatus,
    Player, PlayerHand, PlayerId, Recipient, SessionId, Visibility,
    WinningCards,
};
