//! Input synchronization loop
//!
//! Drives sampling, mapping, state application and transmission once per
//! tick until a termination signal arrives. See [`engine`] for the state
//! machine and [`termination`] for the signal sources.

pub mod engine;
pub mod error;
pub mod termination;

pub use engine::{run_input_sync, InputSync, SyncSettings, SyncStats, TickOutcome};
pub use error::SyncError;
pub use termination::{TerminationHandle, TerminationSignal, TerminationSource};
