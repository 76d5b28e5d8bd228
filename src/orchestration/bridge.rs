//! Bridge orchestrator: top up the destination network from the source.
//!
//! # State Machine
//! ```text
//! CheckDestBalance ──(enough)──────────────────────────────▶ Success (no tx)
//!     │
//!     ▼
//! CheckSourceBalance ──(below fee)─────────────────────────▶ InsufficientFunds
//!     │
//!     ▼
//! GateGasPrice ──(cancelled)───────────────────────────────▶ Failed(Cancelled)
//!     │
//!     ▼
//! ComputeAmount → EstimateGas ──(amount + gas > balance)───▶ Failed(InsufficientFundsInclGas)
//!     │
//!     ▼
//! Submit → AwaitReceipt ───────────────────────────────────▶ Success | Failed
//! ```

use alloy::primitives::U256;
use rand::Rng;

use crate::blockchain::contracts::bridge_deposit;
use crate::blockchain::transaction::with_gas_margin;
use crate::blockchain::{LedgerClient, NetworkRole};
use crate::orchestration::context::StepContext;
use crate::orchestration::outcome::{FailureReason, OperationOutcome, OrchestrationError};
use crate::orchestration::submit::submit_and_confirm;
use crate::orchestration::wait::{await_acceptable_gas, WaitOutcome};
use crate::quoting::types::format_ether;
use crate::quoting::{FeeSchedule, QuoteError, QuoteResult};

/// Run the bridge step for one account.
///
/// `source` and `destination` must both be on the bridge network selection.
pub async fn bridge_account<S, D, R>(
    ctx: &StepContext<'_>,
    source: &S,
    destination: &D,
    rng: &mut R,
) -> Result<OperationOutcome, OrchestrationError>
where
    S: LedgerClient,
    D: LedgerClient,
    R: Rng + ?Sized,
{
    let settings = ctx.settings;
    let address = ctx.account.address;
    let schedule = settings.fee_schedule(&settings.bridge)?;

    let quote_price = if schedule.scalar.needs_source_gas_price() {
        source.get_gas_price().await?
    } else {
        0
    };
    let fee = quote_total(&schedule, quote_price)?;

    let destination_balance = destination.get_balance(address).await?;
    ctx.info(format!(
        "Balance on destination network is {} eth.",
        format_ether(destination_balance)
    ));
    ctx.info(format!("Fee: {} eth", format_ether(fee)));

    if destination_balance >= fee {
        ctx.info("Enough funds on destination network, nothing to bridge.");
        return Ok(OperationOutcome::Success);
    }
    ctx.warning("Insufficient funds on destination network.");

    let source_balance = source.get_balance(address).await?;
    ctx.info(format!("Balance on source network is {} eth.", format_ether(source_balance)));
    if source_balance < fee {
        ctx.error("Insufficient funds on source network. Work at the address has stopped.");
        return Ok(OperationOutcome::InsufficientFunds {
            required: fee,
            available: source_balance,
        });
    }
    ctx.info("Enough funds on source network. Checking whether the amount can be transferred.");

    let ceiling = settings.max_gas_in_gwei.gwei_to_wei()?;
    let gas_price = match await_acceptable_gas(
        source,
        ceiling,
        ctx.timing.gas_poll,
        ctx.cancel,
        ctx.audit,
        &ctx.subject,
    )
    .await?
    {
        WaitOutcome::Ready(price) => price,
        WaitOutcome::Cancelled => {
            ctx.warning("Gas wait cancelled.");
            return Ok(OperationOutcome::Failed(FailureReason::Cancelled));
        }
    };

    // The gate price is the freshest source price; requote with it.
    let fee = if schedule.scalar.needs_source_gas_price() {
        quote_total(&schedule, gas_price)?
    } else {
        fee
    };

    // A draw below zero is outside the envelope like any other.
    let drawn_wei = match settings.bridge_amount.draw(rng) {
        Ok(drawn) => {
            ctx.info(format!("Random amount is {}", drawn));
            Some(drawn.to_wei()?)
        }
        Err(e @ QuoteError::NegativeAmount { .. }) => {
            ctx.warning(e.to_string());
            None
        }
        Err(e) => return Err(e.into()),
    };
    let amount = match drawn_wei {
        Some(drawn_wei) if fee < drawn_wei && drawn_wei < source_balance => drawn_wei,
        _ => {
            ctx.info(format!(
                "Random amount is outside ({} eth, {} eth), bridging the fee instead.",
                format_ether(fee),
                format_ether(source_balance)
            ));
            fee
        }
    };
    ctx.info(format!("Bridge amount is {} eth.", format_ether(amount)));

    let call = bridge_deposit(settings.bridge.bridge_contract, address, amount);
    let gas = with_gas_margin(source.estimate_gas(&call).await?);
    let required = U256::from(gas)
        .saturating_mul(U256::from(gas_price))
        .saturating_add(amount);
    if required > source_balance {
        ctx.error("Insufficient funds including gas.");
        return Ok(OperationOutcome::Failed(FailureReason::InsufficientFundsInclGas {
            required,
            available: source_balance,
        }));
    }

    ctx.info("Sending a transaction for bridge.");
    let outcome = submit_and_confirm(ctx, source, NetworkRole::Source, &call, gas, gas_price).await?;
    match &outcome {
        OperationOutcome::Success => ctx.info("Bridge tx confirmed. Funds arrive on the destination in ~2 min."),
        other => ctx.error(format!("Transaction bridge failed ({}). Work at the address has stopped.", other)),
    }
    Ok(outcome)
}

fn quote_total(schedule: &FeeSchedule, source_gas_price: u128) -> QuoteResult<U256> {
    Ok(schedule.quote(source_gas_price)?.total())
}
