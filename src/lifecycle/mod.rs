//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Shutdown → Cancellation handles → every polling wait
//!     → account ends Failed(Cancelled) → batch halts
//! ```
//!
//! # Design Decisions
//! - A broadcast transaction is never abandoned mid-confirmation by a
//!   signal; only precondition waits observe cancellation

pub mod shutdown;
pub mod signals;

pub use shutdown::{Cancellation, Shutdown};
