//! Core data model for Cardhall.
//!
//! Everything here is the shape of the game as clients see it: these
//! structures are serialized to JSON and handed to the realtime
//! transport, and they are also what the persistence layer stores.
//!
//! The `Game` aggregate deliberately does NOT embed its players or the
//! card-ownership rows — those are separate tables joined at read time
//! (see `cardhall-store`). That keeps a game update from ever rewriting
//! membership or ownership by accident.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a game (one room/match instance).
///
/// Newtype wrapper over `u64` so a `GameId` can never be confused with
/// a `PlayerId` in a signature. `#[serde(transparent)]` serializes it
/// as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// A unique identifier for a player within the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a card in the catalog.
///
/// `Ord` is derived so card ids can live in sorted sets (revealed-card
/// tracking) with a deterministic serialized order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A durable session identifier that survives a transient disconnect.
///
/// Unlike the other ids this is a string: it is minted from the
/// player's nickname plus a timestamp and a random suffix, and the
/// client echoes it back verbatim on reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Card & Player
// ---------------------------------------------------------------------------

/// One card from the catalog. Immutable seed data — created once at
/// setup time and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    /// Display name.
    pub name: String,
    /// Localized display name shown to players.
    pub localized_name: String,
    /// Optional artwork reference (URL or asset key).
    pub artwork: Option<String>,
}

/// A registered player in a game. Nicknames are unique within a game,
/// not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    /// Join timestamp, milliseconds since the Unix epoch.
    pub joined_at_ms: u64,
}

/// One card-ownership row: `card_id` belongs to `player_id` within
/// `game_id`. The store enforces that a card id appears at most once
/// per game across all rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAssignment {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
}

/// A resolved player → cards mapping, used in state snapshots and the
/// `gameStateUpdated` replay payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHand {
    pub player_id: PlayerId,
    pub nickname: String,
    pub cards: Vec<Card>,
}

// ---------------------------------------------------------------------------
// Game lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle status of a game.
///
/// Transitions only ever advance:
///
/// ```text
/// Waiting → Dealing → Active → Completed
/// ```
///
/// The single exception is the hard reset in the state validator,
/// which drops a corrupted game back to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Dealing,
    Active,
    Completed,
}

impl GameStatus {
    /// The next status in the forward-only chain, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Dealing),
            Self::Dealing => Some(Self::Active),
            Self::Active => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Returns `true` if advancing from `self` to `target` is a legal
    /// forward transition.
    pub fn advances_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Returns `true` once the game has left the lobby.
    pub fn has_started(self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Dealing => write!(f, "dealing"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Room visibility in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

// ---------------------------------------------------------------------------
// Auction state
// ---------------------------------------------------------------------------

/// The winning cards selected off the top of deck 1, paired with the
/// prize each rank pays out of the pool.
///
/// `cards[i]` pays `prizes[i]`; both vectors always have the same
/// length (the game's `winner_count`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningCards {
    pub cards: Vec<Card>,
    pub prizes: Vec<f64>,
}

/// The auction state machine for one game, as a tagged sum type.
///
/// Modelled as an enum rather than a struct with a `status` string so
/// `Active`-only fields simply don't exist in the other phases, and
/// every consumer matches exhaustively.
///
/// Invariant while `Active`: `current_card` is never also present in
/// `remaining`, and `current_bid` only moves up until the card settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuctionPhase {
    /// No auction has run yet (placeholder written by `setup_game`).
    Inactive,

    /// One card is on the block.
    #[serde(rename_all = "camelCase")]
    Active {
        /// The card currently under bid.
        current_card: Card,
        /// Highest accepted bid so far. 0 until the first bid lands.
        current_bid: u64,
        /// Who placed `current_bid`, or `None` if nobody has bid.
        highest_bidder: Option<PlayerId>,
        /// Milliseconds left on the soft-close clock.
        time_remaining_ms: u64,
        /// Cards still queued for auction, front first.
        remaining: VecDeque<Card>,
        /// Cards that timed out with no bidder. These go to the random
        /// fallback distribution after the queue empties — they are
        /// never re-auctioned.
        unsold: Vec<Card>,
    },

    /// The whole leftover queue has been settled.
    Completed,
}

impl AuctionPhase {
    /// Returns `true` if a card is currently on the block.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// The card under bid, if an auction round is live.
    pub fn current_card(&self) -> Option<&Card> {
        match self {
            Self::Active { current_card, .. } => Some(current_card),
            _ => None,
        }
    }

    /// Milliseconds left on the clock, if an auction round is live.
    pub fn time_remaining_ms(&self) -> Option<u64> {
        match self {
            Self::Active { time_remaining_ms, .. } => Some(*time_remaining_ms),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Game aggregate
// ---------------------------------------------------------------------------

/// One game (room/match instance). Mutable aggregate, one per room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    /// Short code players use to join. Generated by a collaborator.
    pub join_code: String,
    pub visibility: Visibility,
    pub status: GameStatus,
    pub entrance_fee: u64,
    /// How many winning cards are drawn (1–7).
    pub winner_count: u8,
    pub prize_pool: f64,
    /// Player capacity (2–10).
    pub max_players: u8,
    /// Deck reserved for winning-card selection. After setup this holds
    /// the shuffled catalog minus the selected winners.
    pub deck1: Vec<Card>,
    /// Deck reserved for player hands. After dealing this holds only
    /// the cards routed to the auction.
    pub deck2: Vec<Card>,
    /// Selected winners plus their prize split. `None` until setup.
    pub winning_cards: Option<WinningCards>,
    pub auction: AuctionPhase,
    /// Cards shown so far, in reveal order by id.
    pub revealed_cards: BTreeSet<CardId>,
    pub current_turn: u32,
}

impl Game {
    /// A fresh game in the lobby, before setup.
    pub fn new(
        id: GameId,
        join_code: impl Into<String>,
        entrance_fee: u64,
        winner_count: u8,
        prize_pool: f64,
        max_players: u8,
    ) -> Self {
        Self {
            id,
            join_code: join_code.into(),
            visibility: Visibility::Public,
            status: GameStatus::Waiting,
            entrance_fee,
            winner_count,
            prize_pool,
            max_players,
            deck1: Vec::new(),
            deck2: Vec::new(),
            winning_cards: None,
            auction: AuctionPhase::Inactive,
            revealed_cards: BTreeSet::new(),
            current_turn: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// Game handlers return `(Recipient, ServerEvent)` pairs; the dispatch
/// layer fans them out. `Player` is the unicast path — reconnect
/// replays in particular must never reach the rest of the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every connected player in the game.
    All,
    /// One specific player.
    Player(PlayerId),
    /// Everyone except the specified player.
    AllExcept(PlayerId),
}

// =========================================================================
// Tests
// =========================================================================
