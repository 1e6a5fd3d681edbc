//! Player session tracking for Cardhall.
//!
//! A session ties a player to their seat in a game and survives brief
//! network drops:
//!
//! 1. **Seating** — a join mints a session id ([`SessionRegistry::connect`])
//! 2. **Grace period** — a drop starts a countdown instead of removing
//!    the player ([`SessionRegistry::disconnect`])
//! 3. **Resume** — the client presents its session id to retake the
//!    seat ([`SessionRegistry::reconnect`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)  ← routes disconnect/reconnect to games
//!     ↕
//! Session layer (this crate)  ← tracks identity and connection state
//!     ↕
//! Protocol layer (below)  ← provides SessionId, PlayerId, GameId
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{Session, SessionConfig, SessionState};
