//! The per-game auction countdown.
//!
//! One countdown exists per game actor and is armed only while an
//! auction card is live. It sits inside the actor's `tokio::select!`
//! loop next to the command channel, so a timer-driven settlement runs
//! on the same serialized path as client commands:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = countdown.tick() => { /* count down, settle at zero */ }
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval};

/// Fixed countdown granularity. Each tick subtracts this much from the
/// live auction's remaining time and broadcasts the new value.
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// A cancellable one-second ticker.
///
/// While idle, [`Countdown::tick`] pends forever — the actor's select
/// loop keeps processing commands and simply never takes the timer
/// branch. Cancellation is unconditional and idempotent: cancelling an
/// idle countdown is a no-op.
pub struct Countdown {
    interval: Option<Interval>,
}

impl Countdown {
    /// Creates a countdown in the idle state.
    pub fn idle() -> Self {
        Self { interval: None }
    }

    /// Arms the ticker. The first tick fires one full interval from
    /// now. Restarting a running countdown resets its cadence.
    pub fn start(&mut self) {
        let mut ticker = interval(Duration::from_millis(TICK_INTERVAL_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // `interval` fires immediately on first poll; push the first
        // tick out by one full period.
        ticker.reset();
        self.interval = Some(ticker);
    }

    /// Disarms the ticker. Safe to call any number of times.
    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Waits for the next tick. Pends forever while idle — intended
    /// for use as a `tokio::select!` branch, never awaited alone.
    pub async fn tick(&mut self) {
        match &mut self.interval {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
