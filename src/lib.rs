//! Bridge-and-mint automation library.
//!
//! For each account in a ledger: make sure the destination network holds
//! enough to mint, bridge from the source network when it does not, wait for
//! the funds to land, mint, and record the outcome durably so an interrupted
//! batch resumes where it stopped.

// Core subsystems
pub mod accounts;
pub mod blockchain;
pub mod config;
pub mod orchestration;
pub mod quoting;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use accounts::{Account, AccountStore, JsonAccountStore};
pub use config::{AppConfig, OperationSettings};
pub use lifecycle::Shutdown;
pub use orchestration::{BatchReport, BatchRunner, OperationKind, OperationOutcome};
