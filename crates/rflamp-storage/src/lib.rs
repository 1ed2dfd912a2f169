//! Persistence of last-known lamp state.
//!
//! The controller only reads this once, at startup, to catch its assumed state
//! up with the previous session. Writing it after each change is the job of
//! the orchestration layer.

pub mod error;
pub mod state;
pub mod store;

pub use error::{Error, Result};
pub use state::LastKnownState;
pub use store::{MemoryStateStore, RedbStateStore, StateStore};
