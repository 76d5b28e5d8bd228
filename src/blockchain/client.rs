//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints, optionally through an account proxy
//! - Query chain state (balances, gas price, nonces, receipts)
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::http::{reqwest, Http};
use alloy::transports::TransportResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::ledger::{ContractCall, LedgerClient, LedgerConnector, SignedTx};
use crate::blockchain::transaction::{estimation_request, wait_for_receipt};
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, NetworkRole, ProxySpec, ReceiptOutcome,
};
use crate::config::schema::{EndpointConfig, NetworksConfig, PollingConfig, RpcConfig};
use crate::observability::metrics;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Endpoint this client was built from.
    endpoint: EndpointConfig,
    role: NetworkRole,
    /// Request timeout duration.
    timeout_duration: Duration,
    /// Delay between receipt queries.
    receipt_poll: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// # Arguments
    /// * `role` - Which side of the bridge this endpoint serves
    /// * `endpoint` - RPC URLs and expected chain ID
    /// * `rpc` - Request timeout settings
    /// * `receipt_poll` - Delay between receipt queries
    /// * `proxy` - Optional egress proxy for every request
    pub async fn connect(
        role: NetworkRole,
        endpoint: &EndpointConfig,
        rpc: &RpcConfig,
        receipt_poll: Duration,
        proxy: Option<&ProxySpec>,
    ) -> BlockchainResult<Self> {
        let http_client = http_client(proxy)?;
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = endpoint.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", endpoint.rpc_url, e))
        })?;
        providers.push(provider_for(&http_client, primary_url));

        // 2. Add failover providers
        for url_str in &endpoint.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(provider_for(&http_client, url));
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            endpoint: endpoint.clone(),
            role,
            timeout_duration: Duration::from_secs(rpc.timeout_secs),
            receipt_poll,
        };

        // Verify chain ID matches configuration
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::debug!(
                    network = %role,
                    rpc_url = %endpoint.rpc_url,
                    chain_id = endpoint.chain_id,
                    proxied = proxy.is_some(),
                    "Blockchain client initialized"
                );
            }
            Err(e @ BlockchainError::ChainMismatch { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!(
                    network = %role,
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.endpoint.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.endpoint.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.with_failover("get receipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Which network this client serves.
    pub fn role(&self) -> NetworkRole {
        self.role
    }

    /// Try each provider in turn, bounding every attempt by the RPC timeout.
    async fn with_failover<T, F, Fut>(&self, operation: &'static str, call: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(network = %self.role, provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(network = %self.role, provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All {} providers failed to {}",
            self.role, operation
        )))
    }
}

impl LedgerClient for BlockchainClient {
    fn chain_id(&self) -> u64 {
        self.endpoint.chain_id
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("get balance", |p| async move { p.get_balance(address).await })
            .await
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("get gas price", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("get transaction count", |p| async move {
            p.get_transaction_count(address).await
        })
        .await
    }

    async fn estimate_gas(&self, call: &ContractCall) -> BlockchainResult<u64> {
        let request = estimation_request(call);
        self.with_failover("estimate gas", |p| {
            let request = request.clone();
            async move { p.estimate_gas(request).await }
        })
        .await
    }

    async fn broadcast(&self, tx: &SignedTx) -> BlockchainResult<TxHash> {
        // Re-sending identical signed bytes to a failover cannot double-spend:
        // the nonce and hash are fixed.
        let hash = self
            .with_failover("broadcast transaction", |p| {
                let raw = tx.raw.clone();
                async move { p.send_raw_transaction(&raw).await.map(|pending| *pending.tx_hash()) }
            })
            .await?;
        metrics::record_transaction(self.role.as_str());
        Ok(hash)
    }

    async fn await_receipt(&self, tx_hash: TxHash, wait: Duration) -> BlockchainResult<ReceiptOutcome> {
        wait_for_receipt(tx_hash, wait, self.receipt_poll, |hash| {
            self.get_transaction_receipt(hash)
        })
        .await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("network", &self.role)
            .field("rpc_url", &self.endpoint.rpc_url)
            .field("chain_id", &self.endpoint.chain_id)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

fn http_client(proxy: Option<&ProxySpec>) -> BlockchainResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(proxy) = proxy {
        let route = reqwest::Proxy::all(proxy.url())
            .map_err(|e| BlockchainError::Proxy(format!("{}: {}", proxy, e)))?;
        builder = builder.proxy(route);
    }
    builder
        .build()
        .map_err(|e| BlockchainError::Proxy(format!("HTTP client construction failed: {}", e)))
}

fn provider_for(http_client: &reqwest::Client, url: url::Url) -> DynProvider {
    let transport = Http::with_client(http_client.clone(), url);
    let rpc_client = RpcClient::new(transport, false);
    Arc::new(ProviderBuilder::new().connect_client(rpc_client))
}

/// Opens [`BlockchainClient`]s from the configured networks.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    networks: NetworksConfig,
    rpc: RpcConfig,
    receipt_poll: Duration,
}

impl RpcConnector {
    pub fn new(networks: NetworksConfig, rpc: RpcConfig, polling: &PollingConfig) -> Self {
        Self {
            networks,
            rpc,
            receipt_poll: Duration::from_secs(polling.receipt_poll_secs),
        }
    }
}

impl LedgerConnector for RpcConnector {
    type Client = BlockchainClient;

    async fn connect(
        &self,
        role: NetworkRole,
        testnet: bool,
        proxy: Option<&ProxySpec>,
    ) -> BlockchainResult<BlockchainClient> {
        let endpoint = self.networks.endpoint(role, testnet);
        BlockchainClient::connect(role, endpoint, &self.rpc, self.receipt_poll, proxy).await
    }
}
