//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Account (address, key, proxy)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts, per-account proxy)
//!     → contracts.rs (bridge deposit / mint calldata)
//!     → transaction.rs (build, confirm)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - A broadcast transaction is never re-submitted

pub mod client;
pub mod contracts;
pub mod ledger;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, RpcConnector};
pub use ledger::{ContractCall, LedgerClient, LedgerConnector, SignedTx};
pub use types::{
    BlockchainError, BlockchainResult, ChainId, NetworkRole, ProxySpec, ReceiptOutcome,
};
pub use wallet::Wallet;
