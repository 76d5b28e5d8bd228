//! Ledger capability used by the orchestrators.
//!
//! Orchestration code only ever talks to a [`LedgerClient`]; the production
//! implementation is [`crate::blockchain::BlockchainClient`] and tests
//! substitute scripted clients.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::future::Future;
use std::time::Duration;

use crate::blockchain::transaction::build_legacy;
use crate::blockchain::types::{BlockchainResult, NetworkRole, ProxySpec, ReceiptOutcome};
use crate::blockchain::wallet::Wallet;

/// A contract call before gas and nonce are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub hash: TxHash,
    pub raw: Bytes,
}

/// RPC access to one network.
pub trait LedgerClient: Send + Sync {
    /// Chain ID transactions are signed for.
    fn chain_id(&self) -> u64;

    fn get_balance(&self, address: Address) -> impl Future<Output = BlockchainResult<U256>> + Send;

    /// Current gas price in wei.
    fn get_gas_price(&self) -> impl Future<Output = BlockchainResult<u128>> + Send;

    fn get_transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = BlockchainResult<u64>> + Send;

    fn estimate_gas(&self, call: &ContractCall) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Attach gas, gas price and nonce to a call.
    fn build_transaction(
        &self,
        call: &ContractCall,
        gas: u64,
        gas_price: u128,
        nonce: u64,
    ) -> TransactionRequest {
        build_legacy(call, gas, gas_price, nonce, self.chain_id())
    }

    fn sign(
        &self,
        tx: TransactionRequest,
        wallet: &Wallet,
    ) -> impl Future<Output = BlockchainResult<SignedTx>> + Send {
        wallet.sign_transaction(tx)
    }

    fn broadcast(&self, tx: &SignedTx) -> impl Future<Output = BlockchainResult<TxHash>> + Send;

    /// Wait for the receipt of `tx_hash`, failing with
    /// [`crate::blockchain::BlockchainError::ReceiptTimeout`] after `timeout`.
    fn await_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> impl Future<Output = BlockchainResult<ReceiptOutcome>> + Send;
}

/// Opens ledger clients, one per network and egress route.
pub trait LedgerConnector: Send + Sync {
    type Client: LedgerClient;

    fn connect(
        &self,
        role: NetworkRole,
        testnet: bool,
        proxy: Option<&ProxySpec>,
    ) -> impl Future<Output = BlockchainResult<Self::Client>> + Send;
}
