//! The Cardhall game engine: deck preparation, fair distribution, and
//! the auction state machine.
//!
//! Everything in this crate is synchronous and side-effect free with
//! respect to I/O — functions transform a [`Game`](cardhall_protocol::Game)
//! or return plain assignment lists, and the coordinator layer commits
//! the results through the store. That split keeps the algorithms
//! trivially testable and keeps every persistence write on the
//! per-game serialized path.
//!
//! # Modules
//!
//! - [`deck`] — shuffling and prize-split math (pure functions, no state)
//! - [`distribute`] — deck setup, base hands, leftover balancing
//! - [`auction`] — bid placement, countdown, per-card settlement

pub mod auction;
pub mod deck;
pub mod distribute;
mod error;

pub use auction::{
    open_auction, place_bid, settle_current_card, tick, NextStep, Settlement,
    DEFAULT_BID_WINDOW_MS,
};
pub use deck::{prize_split, shuffled};
pub use distribute::{balance_leftovers, deal_hands, setup_game, Distribution};
pub use error::EngineError;
