//! Account-state orchestration core.
//!
//! # Data Flow
//! ```text
//! BatchRunner (batch.rs)
//!     → per account, per pending step
//!         → LedgerConnector (source + destination clients, account proxy)
//!         → bridge.rs / mint.rs
//!             → wait.rs (gas gate, balance wait)
//!             → submit.rs (sign, broadcast once, await receipt)
//!         → OperationOutcome
//!     → Success: AccountStore::clear_flag
//!     → anything else: halt
//! ```

pub mod batch;
pub mod bridge;
pub mod context;
pub mod mint;
pub mod outcome;
pub mod submit;
pub mod wait;

pub use batch::{AccountOrder, BatchReport, BatchRunner, Halt, StepReport};
pub use bridge::bridge_account;
pub use context::{StepContext, Timing};
pub use mint::mint_account;
pub use outcome::{FailureReason, OperationKind, OperationOutcome, OrchestrationError};
pub use wait::{await_acceptable_gas, await_balance, WaitOutcome};
