//! Client-facing event and request enums.
//!
//! `ServerEvent` is everything the core emits toward the transport
//! collaborator; `ClientRequest` is everything it accepts. Both are
//! internally tagged (`{"type": "bidPlaced", ...}`) with camelCase
//! payload fields, matching what a JavaScript client expects.

use serde::{Deserialize, Serialize};

use crate::{Card, CardId, Game, PlayerHand};

/// Events emitted by the game core.
///
/// Delivery is at-least-once; payloads are designed so that replaying
/// an event is harmless (idempotent handlers on the client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Setup finished: decks built, winners drawn, prizes computed.
    GameStarted { game: Game },

    /// A bid was accepted. Broadcast so everyone sees the new price.
    BidPlaced { nickname: String, amount: u64 },

    /// One-second countdown tick for the live auction.
    TimerUpdated { time_remaining: u64 },

    /// A new card went on the block.
    AuctionStarted { card: Card, time_remaining: u64 },

    /// A card settled — `winner` is `None` when it went unsold.
    AuctionEnded { winner: Option<String>, card: Card },

    /// A player revealed one of their cards.
    CardRevealed { card: Card, is_winner_card: bool },

    /// A new player joined the room (never sent on reconnect).
    PlayerJoined { nickname: String },

    /// A player left. `permanent: false` is the transient notice at
    /// disconnect; `permanent: true` follows if the grace window
    /// elapses with no reconnect.
    PlayerLeft { nickname: String, permanent: bool },

    /// A disconnected player claimed their session within the grace
    /// window.
    PlayerReconnected { nickname: String },

    /// Full-state refresh. Unicast to a reconnecting player; may also
    /// be broadcast after settlement so clients resynchronize.
    GameStateUpdated { game: Game, hands: Vec<PlayerHand> },

    /// The validator found corruption and the game was hard-reset.
    /// Distinct from `Error` so clients can show a specific notice.
    StateReset { message: String },

    /// An expected, user-facing failure (bad bid, stale action, ...).
    /// Always unicast to the originating connection.
    Error { message: String },
}

/// Requests a client can send into the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientRequest {
    /// Force setup now (room owner action).
    StartGame,
    /// Mark the sender ready; setup runs when everyone is.
    ReadyToStart,
    /// Bid on the card currently on the block.
    PlaceBid { amount: u64 },
    /// Reveal one of the sender's own cards.
    RevealCard { card_id: CardId },
    /// Leave the game for good (no grace window).
    LeaveGame,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_uses_camel_case_tag_and_fields() {
        let event = ServerEvent::BidPlaced {
            nickname: "ada".into(),
            amount: 25,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "bidPlaced");
        assert_eq!(json["nickname"], "ada");
        assert_eq!(json["amount"], 25);
    }

    #[test]
    fn test_timer_updated_matches_wire_name() {
        let event = ServerEvent::TimerUpdated { time_remaining: 29_000 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timerUpdated");
        assert_eq!(json["timeRemaining"], 29_000);
    }

    #[test]
    fn test_player_left_carries_permanent_flag() {
        let event = ServerEvent::PlayerLeft {
            nickname: "grace".into(),
            permanent: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "playerLeft");
        assert_eq!(json["permanent"], true);
    }

    #[test]
    fn test_client_request_roundtrips() {
        let req = ClientRequest::PlaceBid { amount: 40 };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"type":"placeBid","amount":40}"#);
        let back: ClientRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_client_request_rejects_unknown_type() {
        let result =
            serde_json::from_str::<ClientRequest>(r#"{"type":"hackTheGibson"}"#);
        assert!(result.is_err());
    }
}
