//! Game-state caching, validation, and rollback.
//!
//! Sits between the engine and the store:
//!
//! ```text
//!   actor ──► StateCache ──► GameStore
//!                │
//!                ├── GameSnapshot   (point-in-time view + history)
//!                └── validate_snapshot (integrity predicate)
//! ```
//!
//! Every state-changing operation ends with a [`StateCache::save`];
//! reads go through [`StateCache::recover`]. When validation fails the
//! cache can roll the game back one step or hard-reset it to the lobby.

mod cache;
mod snapshot;
mod validate;

pub use cache::{DEFAULT_HISTORY_DEPTH, StateCache};
pub use snapshot::GameSnapshot;
pub use validate::validate_snapshot;
