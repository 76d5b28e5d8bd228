//! Results of one orchestration attempt.

use alloy::primitives::{TxHash, U256};
use std::fmt;
use thiserror::Error;

use crate::accounts::Flag;
use crate::blockchain::BlockchainError;
use crate::quoting::types::format_ether;
use crate::quoting::QuoteError;

/// Which flags a batch works through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Bridge,
    Mint,
    /// Bridge where needed, then mint, per account.
    BridgeThenMint,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Bridge => "bridge",
            OperationKind::Mint => "mint",
            OperationKind::BridgeThenMint => "bridge_then_mint",
        }
    }

    /// Steps applied to each eligible account.
    pub fn steps(&self) -> &'static [Flag] {
        match self {
            OperationKind::Bridge => &[Flag::Bridge],
            OperationKind::Mint => &[Flag::Mint],
            OperationKind::BridgeThenMint => &[Flag::Bridge, Flag::Mint],
        }
    }

    pub fn start_banner(&self) -> &'static str {
        match self {
            OperationKind::Bridge => "Bridge! Bridge! Bridge!",
            OperationKind::Mint => "Mint! Mint! Mint!",
            OperationKind::BridgeThenMint => "Work! Work! Work!",
        }
    }

    pub fn finish_banner(&self) -> &'static str {
        match self {
            OperationKind::Bridge => "All wallets bridged.",
            OperationKind::Mint => "All wallets minted.",
            OperationKind::BridgeThenMint => "All wallets finished!",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt ended without success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The transfer plus its gas would exceed the source balance.
    InsufficientFundsInclGas { required: U256, available: U256 },
    TransactionReverted { tx_hash: TxHash, status: u64 },
    ReceiptTimeout { tx_hash: TxHash, waited_secs: u64 },
    MalformedTarget(String),
    Cancelled,
    /// A ledger or store error caught at the batch boundary.
    Unexpected(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::InsufficientFundsInclGas { required, available } => write!(
                f,
                "insufficient funds including gas: need {} eth, have {} eth",
                format_ether(*required),
                format_ether(*available)
            ),
            FailureReason::TransactionReverted { tx_hash, status } => {
                write!(f, "transaction {} failed with status {}", tx_hash, status)
            }
            FailureReason::ReceiptTimeout { tx_hash, waited_secs } => write!(
                f,
                "no receipt for {} after {} seconds; not resubmitted",
                tx_hash, waited_secs
            ),
            FailureReason::MalformedTarget(reason) => write!(f, "malformed mint target: {}", reason),
            FailureReason::Cancelled => f.write_str("cancelled by operator"),
            FailureReason::Unexpected(reason) => write!(f, "unexpected error: {}", reason),
        }
    }
}

/// Tri-state result of one orchestration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Success,
    InsufficientFunds { required: U256, available: U256 },
    Failed(FailureReason),
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success)
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            OperationOutcome::Success => "success",
            OperationOutcome::InsufficientFunds { .. } => "insufficient_funds",
            OperationOutcome::Failed(FailureReason::Cancelled) => "cancelled",
            OperationOutcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationOutcome::Success => f.write_str("success"),
            OperationOutcome::InsufficientFunds { required, available } => write!(
                f,
                "insufficient funds: need {} eth, have {} eth",
                format_ether(*required),
                format_ether(*available)
            ),
            OperationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// An error an orchestrator could not turn into an outcome.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("ledger error: {0}")]
    Ledger(#[from] BlockchainError),

    #[error("invalid amount: {0}")]
    Quote(#[from] QuoteError),
}
