//! Alloy-backed RPC transport.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint (HTTP or WebSocket)
//! - Query chain state (chain id, head, nonce, gas price, logs)
//! - Broadcast signed transactions
//! - Bridge alloy log subscriptions into `LogSubscription`

use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log};
use std::sync::Arc;

use crate::blockchain::transport::{LogSubscription, PumpEnd, RpcTransport};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Default buffer between the node subscription and the consumer.
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 64;

/// RPC transport wrapping an alloy provider.
#[derive(Clone)]
pub struct AlloyTransport {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: String,
    subscription_capacity: usize,
}

impl AlloyTransport {
    /// Connect to an RPC endpoint.
    ///
    /// `http(s)://` URLs get a request/response transport; `ws(s)://` URLs
    /// get a pubsub transport, which live log subscriptions require.
    pub async fn connect(rpc_url: &str) -> BlockchainResult<Self> {
        let parsed: url::Url = rpc_url
            .parse()
            .map_err(|e| BlockchainError::Connection(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let provider: Arc<dyn Provider + Send + Sync> = match parsed.scheme() {
            "http" | "https" => Arc::new(ProviderBuilder::new().connect_http(parsed)),
            _ => Arc::new(
                ProviderBuilder::new()
                    .connect(rpc_url)
                    .await
                    .map_err(|e| BlockchainError::Connection(format!("dial {}: {}", rpc_url, e)))?,
            ),
        };

        tracing::debug!(rpc_url = %rpc_url, "RPC transport connected");

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
            subscription_capacity: DEFAULT_SUBSCRIPTION_CAPACITY,
        })
    }

    /// Set the buffer size used for live subscriptions.
    pub fn with_subscription_capacity(mut self, capacity: usize) -> Self {
        self.subscription_capacity = capacity.max(1);
        self
    }

    /// The endpoint this transport talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl RpcTransport for AlloyTransport {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("eth_chainId: {}", e)))
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("eth_getTransactionCount: {}", e)))
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("eth_gasPrice: {}", e)))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| BlockchainError::Broadcast(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn latest_block_number(&self) -> BlockchainResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("eth_blockNumber: {}", e)))
    }

    async fn filter_logs(&self, filter: &Filter) -> BlockchainResult<Vec<Log>> {
        self.provider
            .get_logs(filter)
            .await
            .map_err(|e| BlockchainError::Rpc(format!("eth_getLogs: {}", e)))
    }

    async fn subscribe_logs(&self, filter: &Filter) -> BlockchainResult<LogSubscription> {
        let subscription = self
            .provider
            .subscribe_logs(filter)
            .await
            .map_err(|e| BlockchainError::Rpc(format!("eth_subscribe(logs): {}", e)))?;

        let (feed, session) = LogSubscription::channel(self.subscription_capacity);
        let provider = self.provider.clone();
        let id = *subscription.local_id();
        tokio::spawn(async move {
            let end = feed.pump(subscription.into_stream()).await;
            match end {
                PumpEnd::ConsumerGone => {
                    tracing::debug!(subscription = %id, "Log consumer gone, releasing node subscription");
                    if let Err(e) = provider.unsubscribe(id).await {
                        tracing::debug!(subscription = %id, error = %e, "eth_unsubscribe failed");
                    }
                }
                PumpEnd::StreamEnded => feed.fail("log subscription stream ended"),
            }
        });

        Ok(session)
    }
}

impl std::fmt::Debug for AlloyTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyTransport")
            .field("rpc_url", &self.rpc_url)
            .field("subscription_capacity", &self.subscription_capacity)
            .finish()
    }
}
