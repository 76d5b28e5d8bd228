//! Mint orchestrator: wait for bridged funds, then mint one item.

use crate::blockchain::contracts::mint_item;
use crate::blockchain::{LedgerClient, NetworkRole};
use crate::orchestration::context::StepContext;
use crate::orchestration::outcome::{FailureReason, OperationOutcome, OrchestrationError};
use crate::orchestration::submit::submit_and_confirm;
use crate::orchestration::wait::{await_balance, WaitOutcome};
use crate::quoting::types::format_ether;

/// Run the mint step for one account.
///
/// `source` is only read when the fee rule needs the live source gas price.
pub async fn mint_account<S, D>(
    ctx: &StepContext<'_>,
    source: &S,
    destination: &D,
) -> Result<OperationOutcome, OrchestrationError>
where
    S: LedgerClient,
    D: LedgerClient,
{
    let settings = ctx.settings;
    let address = ctx.account.address;

    let target = match settings.target.resolve() {
        Ok(target) => target,
        Err(e) => {
            ctx.error(format!("{}. Work at the address has stopped.", e));
            return Ok(OperationOutcome::Failed(FailureReason::MalformedTarget(e.0)));
        }
    };

    let schedule = settings.fee_schedule(&settings.mint)?;
    let quote_price = if schedule.scalar.needs_source_gas_price() {
        source.get_gas_price().await?
    } else {
        0
    };
    let fee = schedule.quote(quote_price)?.total();
    ctx.info(format!("Fee: {} eth", format_ether(fee)));

    match await_balance(
        destination,
        address,
        fee,
        ctx.timing.balance_poll,
        ctx.cancel,
        ctx.audit,
        &ctx.subject,
    )
    .await?
    {
        WaitOutcome::Ready(_) => {}
        WaitOutcome::Cancelled => {
            ctx.warning("Balance wait cancelled.");
            return Ok(OperationOutcome::Failed(FailureReason::Cancelled));
        }
    }

    let call = mint_item(
        target.collection,
        settings.mint.minter_contract,
        target.token_id,
        address,
        settings.mint_price.to_wei()?,
    );
    let gas_price = destination.get_gas_price().await?;

    ctx.info(format!("Sending a transaction for minting {}.", target));
    let outcome = submit_and_confirm(
        ctx,
        destination,
        NetworkRole::Destination,
        &call,
        settings.gas_for_mint,
        gas_price,
    )
    .await?;
    match &outcome {
        OperationOutcome::Success => ctx.info("Mint confirmed."),
        other => ctx.error(format!("Mint failed ({}). Work at the address has stopped.", other)),
    }
    Ok(outcome)
}
