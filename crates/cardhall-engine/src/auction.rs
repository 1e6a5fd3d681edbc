//! Auction state machine transitions.
//!
//! The phases live in `cardhall-protocol` as [`AuctionPhase`]; this
//! module owns the legal transitions between them:
//!
//! ```text
//! Inactive ──(open_auction, leftovers)──→ Active ──(queue empties)──→ Completed
//!                                           │ ▲
//!                                           └─┘ settle_current_card
//!                                               (one loop per card)
//! ```
//!
//! All functions are synchronous and pure with respect to I/O. The
//! game actor drives them from its serialized command queue, so a bid
//! and a timer-driven settlement can never interleave — whichever
//! command loses the race sees the already-advanced phase and fails
//! with `InvalidState`.

use std::collections::VecDeque;

use cardhall_protocol::{AuctionPhase, Card, GameId, PlayerId};

use crate::EngineError;

/// Default soft-close bid window in milliseconds. Every accepted bid
/// resets the clock to this value.
pub const DEFAULT_BID_WINDOW_MS: u64 = 30_000;

/// How one auctioned card was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// The highest bidder takes the card. The caller commits the
    /// ownership row.
    Awarded { card: Card, winner: PlayerId },
    /// Nobody bid; the card joins the random-fallback list and is
    /// never assigned to a player directly.
    Unsold { card: Card },
}

/// What happens after a settlement.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    /// Another card went on the block with a fresh clock.
    NextCard(Card),
    /// The queue is empty. The phase is now `Completed` and the caller
    /// routes `unsold` through the random fallback distribution.
    QueueEmpty { unsold: Vec<Card> },
}

/// Opens the auction over the leftover cards.
///
/// The first leftover goes on the block immediately; the rest queue up
/// FIFO. With no leftovers there is nothing to auction and the phase
/// is `Completed` from the start.
pub fn open_auction(leftovers: Vec<Card>, window_ms: u64) -> AuctionPhase {
    let mut queue: VecDeque<Card> = leftovers.into();
    match queue.pop_front() {
        Some(first) => AuctionPhase::Active {
            current_card: first,
            current_bid: 0,
            highest_bidder: None,
            time_remaining_ms: window_ms,
            remaining: queue,
            unsold: Vec::new(),
        },
        None => AuctionPhase::Completed,
    }
}

/// Places a bid on the card currently on the block.
///
/// A bid must be a strict increase over `current_bid`. On acceptance
/// the clock resets to `window_ms` — the soft-close mechanic.
/// Rejection has no side effect.
///
/// # Errors
/// - [`EngineError::InvalidState`] if no auction is live (including a
///   bid that arrives after the timer already settled its card)
/// - [`EngineError::InvalidBid`] if `amount <= current_bid`
pub fn place_bid(
    game_id: GameId,
    phase: &mut AuctionPhase,
    bidder: PlayerId,
    amount: u64,
    window_ms: u64,
) -> Result<(), EngineError> {
    let AuctionPhase::Active {
        current_bid,
        highest_bidder,
        time_remaining_ms,
        ..
    } = phase
    else {
        return Err(EngineError::InvalidState {
            game: game_id,
            reason: "no active auction".into(),
        });
    };

    if amount <= *current_bid {
        return Err(EngineError::InvalidBid {
            bid: amount,
            current: *current_bid,
        });
    }

    *current_bid = amount;
    *highest_bidder = Some(bidder);
    *time_remaining_ms = window_ms;

    tracing::debug!(%game_id, %bidder, amount, "bid accepted, clock reset");
    Ok(())
}

/// Counts down the live auction clock by `elapsed_ms`, saturating at
/// zero. Returns the new remaining time, or `None` when no auction is
/// live. The caller settles the card once this reaches zero.
pub fn tick(phase: &mut AuctionPhase, elapsed_ms: u64) -> Option<u64> {
    match phase {
        AuctionPhase::Active { time_remaining_ms, .. } => {
            *time_remaining_ms = time_remaining_ms.saturating_sub(elapsed_ms);
            Some(*time_remaining_ms)
        }
        _ => None,
    }
}

/// Settles the card on the block after its timer expired.
///
/// Driven by the countdown, never by client request. Awards the card
/// to the highest bidder (caller persists the ownership row) or parks
/// it on the unsold list, then either advances to the next queued card
/// with a fresh clock or completes the whole phase.
///
/// # Errors
/// [`EngineError::InvalidState`] if no auction is live.
pub fn settle_current_card(
    game_id: GameId,
    phase: &mut AuctionPhase,
    window_ms: u64,
) -> Result<(Settlement, NextStep), EngineError> {
    let AuctionPhase::Active {
        current_card,
        current_bid,
        highest_bidder,
        time_remaining_ms,
        remaining,
        unsold,
    } = phase
    else {
        return Err(EngineError::InvalidState {
            game: game_id,
            reason: "no active auction to settle".into(),
        });
    };

    let card = current_card.clone();
    let settlement = match highest_bidder.take() {
        Some(winner) => {
            tracing::info!(%game_id, card = %card.id, %winner, bid = *current_bid, "auction won");
            Settlement::Awarded { card: card.clone(), winner }
        }
        None => {
            tracing::info!(%game_id, card = %card.id, "no bids, card goes to fallback");
            unsold.push(card.clone());
            Settlement::Unsold { card }
        }
    };

    let next = match remaining.pop_front() {
        Some(next_card) => {
            *current_card = next_card.clone();
            *current_bid = 0;
            *highest_bidder = None;
            *time_remaining_ms = window_ms;
            NextStep::NextCard(next_card)
        }
        None => {
            let unsold = std::mem::take(unsold);
            *phase = AuctionPhase::Completed;
            NextStep::QueueEmpty { unsold }
        }
    };

    Ok((settlement, next))
}

// =========================================================================
// Tests
// =========================================================================
