//! Sign, broadcast and confirm one transaction.

use crate::blockchain::{BlockchainError, ContractCall, LedgerClient, NetworkRole};
use crate::orchestration::context::StepContext;
use crate::orchestration::outcome::{FailureReason, OperationOutcome, OrchestrationError};

/// Submit `call` exactly once and wait for its receipt.
///
/// A receipt timeout is reported, never followed by a resubmission.
pub async fn submit_and_confirm<C: LedgerClient>(
    ctx: &StepContext<'_>,
    client: &C,
    network: NetworkRole,
    call: &ContractCall,
    gas: u64,
    gas_price: u128,
) -> Result<OperationOutcome, OrchestrationError> {
    let wallet = ctx.account.wallet()?;
    let nonce = client.get_transaction_count(ctx.account.address).await?;
    let tx = client.build_transaction(call, gas, gas_price, nonce);
    let signed = client.sign(tx, &wallet).await?;

    let tx_hash = client.broadcast(&signed).await?;
    ctx.info(format!("Transaction hash on {} network: {}", network, tx_hash));

    match client.await_receipt(tx_hash, ctx.timing.receipt_timeout).await {
        Ok(receipt) if receipt.succeeded() => {
            tracing::debug!(
                account = %ctx.subject,
                tx_hash = %tx_hash,
                block = ?receipt.block_number,
                "Transaction confirmed"
            );
            Ok(OperationOutcome::Success)
        }
        Ok(receipt) => Ok(OperationOutcome::Failed(FailureReason::TransactionReverted {
            tx_hash,
            status: receipt.status,
        })),
        Err(BlockchainError::ReceiptTimeout { tx_hash, waited_secs }) => {
            Ok(OperationOutcome::Failed(FailureReason::ReceiptTimeout { tx_hash, waited_secs }))
        }
        Err(e) => Err(e.into()),
    }
}
