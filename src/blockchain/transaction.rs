//! Transaction building and confirmation monitoring.
//!
//! # Responsibilities
//! - Build legacy (gas-price) transactions from a contract call
//! - Apply the estimation safety margin
//! - Poll for a receipt within a bounded wait
//!
//! A broadcast transaction is never re-sent: a missing receipt is reported,
//! not retried.

use alloy::network::TransactionBuilder;
use alloy::primitives::TxHash;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::ledger::ContractCall;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ReceiptOutcome};

/// Estimated gas is inflated by this many tenths (20% margin).
pub const GAS_MARGIN_TENTHS: u64 = 12;

/// Populate a legacy transaction request for `call`.
pub fn build_legacy(
    call: &ContractCall,
    gas: u64,
    gas_price: u128,
    nonce: u64,
    chain_id: u64,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(call.from)
        .with_to(call.to)
        .with_value(call.value)
        .with_input(call.input.clone())
        .with_nonce(nonce)
        .with_gas_price(gas_price)
        .with_gas_limit(gas)
        .with_chain_id(chain_id)
}

/// Call request used for gas estimation.
pub fn estimation_request(call: &ContractCall) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(call.from)
        .with_to(call.to)
        .with_value(call.value)
        .with_input(call.input.clone())
}

/// `ceil(estimated * 1.2)`.
pub fn with_gas_margin(estimated: u64) -> u64 {
    let scaled = u128::from(estimated) * u128::from(GAS_MARGIN_TENTHS);
    u64::try_from(scaled.div_ceil(10)).unwrap_or(u64::MAX)
}

/// Poll `fetch` until a receipt appears or `wait` elapses.
///
/// Query errors are logged and retried; only the elapsed bound ends the wait.
///
/// # Arguments
/// * `tx_hash` - Transaction hash to monitor
/// * `wait` - Maximum time to wait for the receipt
/// * `poll_interval` - Delay between receipt queries
pub async fn wait_for_receipt<F, Fut>(
    tx_hash: TxHash,
    wait: Duration,
    poll_interval: Duration,
    fetch: F,
) -> BlockchainResult<ReceiptOutcome>
where
    F: Fn(TxHash) -> Fut,
    Fut: Future<Output = BlockchainResult<Option<TransactionReceipt>>>,
{
    let result = timeout(wait, async {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;

            // A failed query says nothing about the transaction; keep polling.
            match fetch(tx_hash).await {
                Ok(Some(receipt)) => {
                    return ReceiptOutcome {
                        tx_hash,
                        status: u64::from(receipt.status()),
                        block_number: receipt.block_number,
                    };
                }
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt query failed, retrying");
                }
            }
        }
    })
    .await;

    match result {
        Ok(outcome) => Ok(outcome),
        Err(_) => Err(BlockchainError::ReceiptTimeout {
            tx_hash,
            waited_secs: wait.as_secs(),
        }),
    }
}
