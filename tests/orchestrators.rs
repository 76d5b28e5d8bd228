//! Bridge and mint orchestrators against scripted ledgers.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::U256;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

use bridge_mint::config::MintTargetSpec;
use bridge_mint::lifecycle::{Cancellation, Shutdown};
use bridge_mint::orchestration::{
    await_acceptable_gas, bridge_account, mint_account, FailureReason, OperationOutcome,
    StepContext, Timing, WaitOutcome,
};
use bridge_mint::quoting::AmountStrategy;

mod common;
use common::{account, eth, settings, Level, MockLedger, ReceiptBehavior, RecordingAudit, GWEI};

fn decode(raw: &[u8]) -> TxEnvelope {
    TxEnvelope::decode_2718(&mut &raw[..]).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_gas_gate_polls_until_price_at_ceiling() {
    let ledger = MockLedger::new(1).with_gas_prices(vec![25 * GWEI, 22 * GWEI, 17 * GWEI]);
    let audit = RecordingAudit::default();
    let started = tokio::time::Instant::now();

    let outcome = await_acceptable_gas(
        &ledger,
        U256::from(18 * GWEI),
        Duration::from_secs(5),
        &Cancellation::never(),
        &audit,
        "0xf39F…2266",
    )
    .await
    .unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(17 * GWEI));
    assert_eq!(ledger.gas_price_calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert!(audit.contains(Level::Info, "Gas price is 17 gwei"));
}

#[tokio::test(start_paused = true)]
async fn test_gas_gate_returns_immediately_when_acceptable() {
    let ledger = MockLedger::new(1).with_gas_prices(vec![18 * GWEI]);
    let started = tokio::time::Instant::now();

    let outcome = await_acceptable_gas(
        &ledger,
        U256::from(18 * GWEI),
        Duration::from_secs(5),
        &Cancellation::never(),
        &RecordingAudit::default(),
        "subject",
    )
    .await
    .unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(18 * GWEI));
    assert_eq!(ledger.gas_price_calls(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_bridge_noop_when_destination_funded() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1).with_balances(vec![eth(1000)]);
    let destination = MockLedger::new(7_777_777).with_balances(vec![eth(10)]);

    let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();

    assert_eq!(outcome, OperationOutcome::Success);
    assert!(source.broadcasts().is_empty());
    assert_eq!(source.balance_calls(), 0);
}

#[tokio::test]
async fn test_bridge_insufficient_source_funds() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1).with_balances(vec![U256::from(1_000u64)]);
    let destination = MockLedger::new(7_777_777);

    let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();

    assert!(matches!(outcome, OperationOutcome::InsufficientFunds { .. }));
    assert!(source.broadcasts().is_empty());
    assert!(audit.contains(Level::Error, "Insufficient funds on source network"));
}

#[tokio::test]
async fn test_bridge_submits_one_humanized_deposit() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1).with_balances(vec![eth(1000)]);
    let destination = MockLedger::new(7_777_777);

    let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(7))
        .await
        .unwrap();
    assert_eq!(outcome, OperationOutcome::Success);

    let sent = source.broadcasts();
    assert_eq!(sent.len(), 1);
    assert!(destination.broadcasts().is_empty());

    let tx = decode(&sent[0].raw);
    assert_eq!(tx.to(), Some(settings.bridge.bridge_contract));
    assert_eq!(tx.gas_limit(), 120_000);
    assert_eq!(tx.gas_price(), Some(10 * GWEI));
    assert_eq!(tx.chain_id(), Some(1));
    // 0.001 ± 0.00005 eth
    assert!(tx.value() >= U256::from(950_000_000_000_000u64));
    assert!(tx.value() <= U256::from(1_050_000_000_000_000u64));
}

#[tokio::test]
async fn test_bridge_falls_back_to_fee_outside_envelope() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    // 0.0009 eth: above the fee, below every humanized amount.
    let source_balance = U256::from(900_000_000_000_000u64);
    let gas_price = GWEI / 10;
    let source = MockLedger::new(1)
        .with_balances(vec![source_balance])
        .with_gas_prices(vec![gas_price]);
    let destination = MockLedger::new(7_777_777);

    let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();
    assert_eq!(outcome, OperationOutcome::Success);

    let fee = settings
        .fee_schedule(&settings.bridge)
        .unwrap()
        .quote(gas_price)
        .unwrap()
        .total();
    let tx = decode(&source.broadcasts()[0].raw);
    assert_eq!(tx.value(), fee);
    assert!(audit.contains(Level::Info, "bridging the fee instead"));
}

#[tokio::test]
async fn test_bridge_negative_draw_falls_back_to_fee() {
    let mut settings = settings();
    settings.bridge_amount = AmountStrategy::Around {
        center: "0.0001".parse().unwrap(),
        accuracy: "0.001".parse().unwrap(),
    };
    let account = account(0, true, false);
    let cancel = Cancellation::never();
    let fee = settings
        .fee_schedule(&settings.bridge)
        .unwrap()
        .quote(10 * GWEI)
        .unwrap()
        .total();

    let mut negative_draws = 0;
    for seed in 0..20 {
        let audit = RecordingAudit::default();
        let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());
        let source = MockLedger::new(1).with_balances(vec![eth(1_000_000)]);
        let destination = MockLedger::new(7_777_777);

        let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(seed))
            .await
            .unwrap();
        assert_eq!(outcome, OperationOutcome::Success, "seed {}", seed);

        let sent = source.broadcasts();
        assert_eq!(sent.len(), 1, "seed {}", seed);
        let value = decode(&sent[0].raw).value();
        if audit.contains(Level::Warning, "is negative") {
            negative_draws += 1;
            assert_eq!(value, fee, "seed {}", seed);
        } else {
            assert!(value >= fee && value <= U256::from(1_100_000_000_000_000u64));
        }
    }
    assert!(negative_draws > 0);
}

#[tokio::test]
async fn test_bridge_insufficient_including_gas() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    // 0.0011 eth covers the amount but not 120k gas at 10 gwei.
    let source = MockLedger::new(1).with_balances(vec![U256::from(1_100_000_000_000_000u64)]);
    let destination = MockLedger::new(7_777_777);

    let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(5))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureReason::InsufficientFundsInclGas { .. })
    ));
    assert!(source.broadcasts().is_empty());
}

#[tokio::test]
async fn test_bridge_reverted_and_timed_out() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());
    let destination = MockLedger::new(7_777_777);

    let reverted = MockLedger::new(1)
        .with_balances(vec![eth(1000)])
        .with_receipt(ReceiptBehavior::Status(0));
    let outcome = bridge_account(&ctx, &reverted, &destination, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureReason::TransactionReverted { status: 0, .. })
    ));
    assert_eq!(reverted.broadcasts().len(), 1);

    let stuck = MockLedger::new(1)
        .with_balances(vec![eth(1000)])
        .with_receipt(ReceiptBehavior::Timeout);
    let outcome = bridge_account(&ctx, &stuck, &destination, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureReason::ReceiptTimeout { waited_secs: 600, .. })
    ));
    assert_eq!(stuck.broadcasts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bridge_gas_wait_cancelled() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let shutdown = Arc::new(Shutdown::new());
    let cancel = shutdown.cancellation();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1)
        .with_balances(vec![eth(1000)])
        .with_gas_prices(vec![100 * GWEI]);
    let destination = MockLedger::new(7_777_777);

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        trigger.trigger();
    });

    let outcome = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();
    assert_eq!(outcome, OperationOutcome::Failed(FailureReason::Cancelled));
    assert!(source.broadcasts().is_empty());
}

#[tokio::test]
async fn test_bridge_rpc_error_is_propagated() {
    let settings = settings();
    let account = account(0, true, false);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1).failing();
    let destination = MockLedger::new(7_777_777);

    let result = bridge_account(&ctx, &source, &destination, &mut StdRng::seed_from_u64(1)).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_mint_waits_for_bridged_funds() {
    let settings = settings();
    let account = account(1, false, true);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1);
    let destination = MockLedger::new(7_777_777)
        .with_balances(vec![U256::ZERO, U256::ZERO, eth(5)])
        .with_gas_prices(vec![GWEI / 200]);
    let started = tokio::time::Instant::now();

    let outcome = mint_account(&ctx, &source, &destination).await.unwrap();

    assert_eq!(outcome, OperationOutcome::Success);
    assert_eq!(destination.balance_calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert!(source.broadcasts().is_empty());

    let sent = destination.broadcasts();
    assert_eq!(sent.len(), 1);
    let tx = decode(&sent[0].raw);
    assert_eq!(
        tx.to(),
        Some("0xF41A3e3033D4e878943194B729AeC993a4Ea2045".parse().unwrap())
    );
    assert_eq!(tx.value(), U256::from(777_000_000_000_000u64));
    assert_eq!(tx.gas_limit(), 130_000);
    assert_eq!(tx.gas_price(), Some(GWEI / 200));
    assert_eq!(tx.chain_id(), Some(7_777_777));
    assert!(audit.contains(Level::Info, "Waiting for bridge confirmation"));
}

#[tokio::test]
async fn test_mint_malformed_target() {
    let mut settings = settings();
    settings.target = MintTargetSpec {
        nft_contract: None,
        nft_url: Some("https://example.org/not-a-collection".to_string()),
        nft_id: None,
    };
    let account = account(1, false, true);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());

    let source = MockLedger::new(1);
    let destination = MockLedger::new(7_777_777);

    let outcome = mint_account(&ctx, &source, &destination).await.unwrap();
    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureReason::MalformedTarget(_))
    ));
    assert_eq!(destination.balance_calls(), 0);
    assert!(destination.broadcasts().is_empty());
}

#[tokio::test]
async fn test_mint_reverted_and_timed_out() {
    let settings = settings();
    let account = account(1, false, true);
    let audit = RecordingAudit::default();
    let cancel = Cancellation::never();
    let ctx = StepContext::new(&account, &settings, &audit, &cancel, Timing::default());
    let source = MockLedger::new(1);

    let reverted = MockLedger::new(7_777_777)
        .with_balances(vec![eth(10)])
        .with_receipt(ReceiptBehavior::Status(0));
    let outcome = mint_account(&ctx, &source, &reverted).await.unwrap();
    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureReason::TransactionReverted { status: 0, .. })
    ));
    assert_eq!(reverted.broadcasts().len(), 1);

    let stuck = MockLedger::new(7_777_777)
        .with_balances(vec![eth(10)])
        .with_receipt(ReceiptBehavior::Timeout);
    let outcome = mint_account(&ctx, &source, &stuck).await.unwrap();
    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureReason::ReceiptTimeout { waited_secs: 600, .. })
    ));
    assert_eq!(stuck.broadcasts().len(), 1);
    assert!(audit.contains(Level::Error, "Mint failed"));
}
