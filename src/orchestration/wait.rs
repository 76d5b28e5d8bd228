//! Precondition waits: fixed-interval polling with cancellation.
//!
//! Neither wait has an iteration bound. Each iteration checks the
//! cancellation handle, and the sleep between polls races against it.

use alloy::primitives::{Address, U256};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::blockchain::{BlockchainResult, LedgerClient};
use crate::lifecycle::Cancellation;
use crate::observability::{metrics, AuditLog};
use crate::quoting::types::{format_ether, format_gwei, format_units, GWEI_DECIMALS};

/// Result of a wait that may be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Ready(T),
    Cancelled,
}

/// Call `check` every `poll` until it yields a value or `cancel` fires.
pub async fn poll_until<T, F, Fut>(
    poll: Duration,
    cancel: &Cancellation,
    mut check: F,
) -> BlockchainResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BlockchainResult<Option<T>>>,
{
    loop {
        if cancel.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }
        if let Some(value) = check().await? {
            return Ok(WaitOutcome::Ready(value));
        }
        tokio::select! {
            _ = sleep(poll) => {}
            _ = cancel.cancelled() => return Ok(WaitOutcome::Cancelled),
        }
    }
}

/// Wait until the gas price on `client` is at or below `ceiling_wei`.
///
/// Returns the accepted price in wei. The first poll happens immediately.
pub async fn await_acceptable_gas<C: LedgerClient>(
    client: &C,
    ceiling_wei: U256,
    poll: Duration,
    cancel: &Cancellation,
    audit: &dyn AuditLog,
    subject: &str,
) -> BlockchainResult<WaitOutcome<u128>> {
    poll_until(poll, cancel, || async move {
        let price = client.get_gas_price().await?;
        audit.info(subject, &format!("Gas price is {} gwei", format_gwei(price)));

        if U256::from(price) <= ceiling_wei {
            audit.info(
                subject,
                &format!(
                    "Gas price is at or below {} gwei from settings.",
                    format_units(ceiling_wei, GWEI_DECIMALS)
                ),
            );
            return Ok(Some(price));
        }
        metrics::record_gas_poll();
        Ok(None)
    })
    .await
}

/// Wait until `address` holds at least `required` on `client`.
///
/// Returns the observed balance.
pub async fn await_balance<C: LedgerClient>(
    client: &C,
    address: Address,
    required: U256,
    poll: Duration,
    cancel: &Cancellation,
    audit: &dyn AuditLog,
    subject: &str,
) -> BlockchainResult<WaitOutcome<U256>> {
    poll_until(poll, cancel, || async move {
        let balance = client.get_balance(address).await?;
        if balance >= required {
            audit.info(
                subject,
                &format!("Balance on destination network is {} eth.", format_ether(balance)),
            );
            return Ok(Some(balance));
        }
        metrics::record_balance_poll();
        audit.info(
            subject,
            &format!(
                "Waiting for bridge confirmation on destination network. Re-verify after {} seconds.",
                poll.as_secs()
            ),
        );
        Ok(None)
    })
    .await
}
