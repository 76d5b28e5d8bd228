//! Shared utilities for orchestration and batch tests.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, U256};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bridge_mint::accounts::{
    Account, AccountId, AccountRecord, AccountStore, Flag, MemoryAccountStore, StoreResult,
};
use bridge_mint::blockchain::{
    BlockchainError, BlockchainResult, ContractCall, LedgerClient, LedgerConnector, NetworkRole,
    ProxySpec, ReceiptOutcome, SignedTx,
};
use bridge_mint::config::{resolve_settings, AppConfig, OperationSettings};
use bridge_mint::observability::AuditLog;

/// Anvil's first three development keys and their addresses.
pub const KEYS: [(&str, &str); 3] = [
    (
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    ),
    (
        "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
    ),
    (
        "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
        "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
    ),
];

pub const GWEI: u128 = 1_000_000_000;

pub fn eth(milli: u64) -> U256 {
    U256::from(milli) * U256::from(1_000_000_000_000_000u64)
}

/// A validated account built from one of [`KEYS`].
pub fn account(index: usize, bridge: bool, mint: bool) -> Account {
    let (key, address) = KEYS[index];
    Account::from_record(
        index,
        AccountRecord {
            address: address.to_string(),
            private_key: key.to_string(),
            proxy: None,
            bridge,
            mint,
        },
    )
    .unwrap()
}

/// Default settings (mainnet, bridge amount 0.001 ± 0.00005 eth).
pub fn settings() -> OperationSettings {
    resolve_settings(&AppConfig::default()).unwrap()
}

/// What `await_receipt` reports.
#[derive(Debug, Clone, Copy)]
pub enum ReceiptBehavior {
    Status(u64),
    Timeout,
}

#[derive(Debug)]
struct LedgerState {
    balances: Vec<U256>,
    gas_prices: Vec<u128>,
    estimate: u64,
    receipt: ReceiptBehavior,
    failing: bool,
    balance_calls: usize,
    gas_price_calls: usize,
    broadcasts: Vec<SignedTx>,
}

/// Scripted ledger. Balance and gas price reads walk their script and
/// repeat the last entry once it runs out.
#[derive(Debug, Clone)]
pub struct MockLedger {
    chain_id: u64,
    state: Arc<Mutex<LedgerState>>,
}

fn pick<T: Copy>(script: &[T], call: usize) -> T {
    script[call.min(script.len() - 1)]
}

impl MockLedger {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Arc::new(Mutex::new(LedgerState {
                balances: vec![U256::ZERO],
                gas_prices: vec![10 * GWEI],
                estimate: 100_000,
                receipt: ReceiptBehavior::Status(1),
                failing: false,
                balance_calls: 0,
                gas_price_calls: 0,
                broadcasts: Vec::new(),
            })),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    pub fn with_balances(self, balances: Vec<U256>) -> Self {
        self.state().balances = balances;
        self
    }

    pub fn with_gas_prices(self, prices: Vec<u128>) -> Self {
        self.state().gas_prices = prices;
        self
    }

    pub fn with_estimate(self, estimate: u64) -> Self {
        self.state().estimate = estimate;
        self
    }

    pub fn with_receipt(self, receipt: ReceiptBehavior) -> Self {
        self.state().receipt = receipt;
        self
    }

    pub fn failing(self) -> Self {
        self.state().failing = true;
        self
    }

    pub fn balance_calls(&self) -> usize {
        self.state().balance_calls
    }

    pub fn gas_price_calls(&self) -> usize {
        self.state().gas_price_calls
    }

    pub fn broadcasts(&self) -> Vec<SignedTx> {
        self.state().broadcasts.clone()
    }

    fn check(&self) -> BlockchainResult<()> {
        if self.state().failing {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(())
    }
}

impl LedgerClient for MockLedger {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn get_balance(&self, _address: Address) -> BlockchainResult<U256> {
        self.check()?;
        let mut state = self.state();
        let balance = pick(&state.balances, state.balance_calls);
        state.balance_calls += 1;
        Ok(balance)
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.check()?;
        let mut state = self.state();
        let price = pick(&state.gas_prices, state.gas_price_calls);
        state.gas_price_calls += 1;
        Ok(price)
    }

    async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        self.check()?;
        Ok(self.state().broadcasts.len() as u64)
    }

    async fn estimate_gas(&self, _call: &ContractCall) -> BlockchainResult<u64> {
        self.check()?;
        Ok(self.state().estimate)
    }

    async fn broadcast(&self, tx: &SignedTx) -> BlockchainResult<TxHash> {
        self.check()?;
        self.state().broadcasts.push(tx.clone());
        Ok(tx.hash)
    }

    async fn await_receipt(&self, tx_hash: TxHash, timeout: Duration) -> BlockchainResult<ReceiptOutcome> {
        match self.state().receipt {
            ReceiptBehavior::Status(status) => Ok(ReceiptOutcome {
                tx_hash,
                status,
                block_number: Some(1),
            }),
            ReceiptBehavior::Timeout => Err(BlockchainError::ReceiptTimeout {
                tx_hash,
                waited_secs: timeout.as_secs(),
            }),
        }
    }
}

/// Hands out clones of two scripted ledgers and records every connect.
#[derive(Debug, Clone)]
pub struct MockConnector {
    pub source: MockLedger,
    pub destination: MockLedger,
    connects: Arc<Mutex<Vec<(NetworkRole, bool, Option<String>)>>>,
}

impl MockConnector {
    pub fn new(source: MockLedger, destination: MockLedger) -> Self {
        Self {
            source,
            destination,
            connects: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn connects(&self) -> Vec<(NetworkRole, bool, Option<String>)> {
        self.connects.lock().unwrap().clone()
    }

    /// One orchestrator invocation opens one source and one destination client.
    pub fn invocations(&self) -> usize {
        self.connects()
            .iter()
            .filter(|(role, _, _)| *role == NetworkRole::Source)
            .count()
    }
}

impl LedgerConnector for MockConnector {
    type Client = MockLedger;

    async fn connect(
        &self,
        role: NetworkRole,
        testnet: bool,
        proxy: Option<&ProxySpec>,
    ) -> BlockchainResult<MockLedger> {
        self.connects
            .lock()
            .unwrap()
            .push((role, testnet, proxy.map(ToString::to_string)));
        Ok(match role {
            NetworkRole::Source => self.source.clone(),
            NetworkRole::Destination => self.destination.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
    Banner,
}

/// Audit sink that keeps every line.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    lines: Mutex<Vec<(Level, String, String)>>,
}

impl RecordingAudit {
    pub fn lines(&self) -> Vec<(Level, String, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, fragment: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, _, message)| *l == level && message.contains(fragment))
    }

    fn push(&self, level: Level, subject: &str, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((level, subject.to_string(), message.to_string()));
    }
}

impl AuditLog for RecordingAudit {
    fn info(&self, subject: &str, message: &str) {
        self.push(Level::Info, subject, message);
    }

    fn warning(&self, subject: &str, message: &str) {
        self.push(Level::Warning, subject, message);
    }

    fn error(&self, subject: &str, message: &str) {
        self.push(Level::Error, subject, message);
    }

    fn banner(&self, message: &str) {
        self.push(Level::Banner, "", message);
    }
}

/// Memory store that counts writes.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryAccountStore,
    writes: Mutex<usize>,
}

impl CountingStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            inner: MemoryAccountStore::new(accounts),
            writes: Mutex::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl AccountStore for CountingStore {
    fn load_all(&self) -> StoreResult<Vec<Account>> {
        self.inner.load_all()
    }

    fn persist(&self, accounts: &[Account]) -> StoreResult<()> {
        *self.writes.lock().unwrap() += 1;
        self.inner.persist(accounts)
    }

    fn clear_flag(&self, id: AccountId, flag: Flag) -> StoreResult<Account> {
        *self.writes.lock().unwrap() += 1;
        self.inner.clear_flag(id, flag)
    }
}
