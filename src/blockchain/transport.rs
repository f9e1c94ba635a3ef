//! RPC transport abstraction.
//!
//! `RpcTransport` is the seam between the attestation logic and the
//! network. The production implementation lives in `client.rs`; tests
//! drive the signer and the watcher through scripted implementations.

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::{Filter, Log};
use futures_util::{Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::blockchain::types::BlockchainResult;

/// The JSON-RPC operations the attestation tools rely on.
pub trait RpcTransport: Send + Sync {
    /// Chain id reported by the node.
    fn chain_id(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Next unused nonce for `address`, counting pending transactions.
    fn pending_nonce(&self, address: Address) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Suggested legacy gas price in wei.
    fn gas_price(&self) -> impl Future<Output = BlockchainResult<u128>> + Send;

    /// Broadcast an EIP-2718 encoded signed transaction.
    fn send_raw_transaction(&self, raw: &[u8]) -> impl Future<Output = BlockchainResult<TxHash>> + Send;

    /// Number of the current chain head.
    fn latest_block_number(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// One-shot historical log query.
    fn filter_logs(&self, filter: &Filter) -> impl Future<Output = BlockchainResult<Vec<Log>>> + Send;

    /// Open a live log subscription for `filter`.
    fn subscribe_logs(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = BlockchainResult<LogSubscription>> + Send;
}

impl<T: RpcTransport> RpcTransport for Arc<T> {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        (**self).chain_id().await
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        (**self).pending_nonce(address).await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        (**self).gas_price().await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        (**self).send_raw_transaction(raw).await
    }

    async fn latest_block_number(&self) -> BlockchainResult<u64> {
        (**self).latest_block_number().await
    }

    async fn filter_logs(&self, filter: &Filter) -> BlockchainResult<Vec<Log>> {
        (**self).filter_logs(filter).await
    }

    async fn subscribe_logs(&self, filter: &Filter) -> BlockchainResult<LogSubscription> {
        (**self).subscribe_logs(filter).await
    }
}

/// What a live subscription yields next.
#[derive(Debug)]
pub enum SubscriptionEvent {
    /// A log entry matching the filter.
    Log(Box<Log>),
    /// The subscription is gone and must be replaced.
    Failed(String),
}

/// Consumer half of a live log subscription.
///
/// Owns the incoming log channel and the failure signal. A session is never
/// repaired: once it reports `Failed` the owner drops it and subscribes
/// again. Dropping it releases the producer side.
#[derive(Debug)]
pub struct LogSubscription {
    logs: mpsc::Receiver<Log>,
    failure: oneshot::Receiver<String>,
    failed: Option<String>,
}

/// Producer half of a live log subscription.
#[derive(Debug)]
pub struct SubscriptionFeed {
    logs: mpsc::Sender<Log>,
    failure: Option<oneshot::Sender<String>>,
}

impl LogSubscription {
    /// Create a connected feed/subscription pair with a bounded log buffer.
    pub fn channel(capacity: usize) -> (SubscriptionFeed, LogSubscription) {
        let (log_tx, log_rx) = mpsc::channel(capacity.max(1));
        let (fail_tx, fail_rx) = oneshot::channel();
        (
            SubscriptionFeed {
                logs: log_tx,
                failure: Some(fail_tx),
            },
            LogSubscription {
                logs: log_rx,
                failure: fail_rx,
                failed: None,
            },
        )
    }

    /// Wait for the next log or for the subscription to fail.
    ///
    /// Logs already buffered are drained before a failure is reported.
    /// Cancel-safe: dropping the future loses nothing.
    pub async fn next_event(&mut self) -> SubscriptionEvent {
        if let Some(reason) = &self.failed {
            return SubscriptionEvent::Failed(reason.clone());
        }

        tokio::select! {
            biased;
            Some(log) = self.logs.recv() => SubscriptionEvent::Log(Box::new(log)),
            reason = &mut self.failure => {
                let reason = reason.unwrap_or_else(|_| "subscription closed".to_string());
                self.failed = Some(reason.clone());
                SubscriptionEvent::Failed(reason)
            }
        }
    }
}

/// Why `SubscriptionFeed::pump` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    /// The subscriber dropped its half.
    ConsumerGone,
    /// The source stream ran dry.
    StreamEnded,
}

impl SubscriptionFeed {
    /// Copy logs from `stream` into the subscription until either side
    /// goes away. Returns as soon as the subscriber is dropped, even while
    /// the stream is idle.
    pub async fn pump<S>(&self, stream: S) -> PumpEnd
    where
        S: Stream<Item = Log>,
    {
        let mut stream = std::pin::pin!(stream);
        loop {
            let next = tokio::select! {
                biased;
                _ = self.closed() => return PumpEnd::ConsumerGone,
                next = stream.next() => next,
            };
            match next {
                Some(log) => {
                    if !self.deliver(log).await {
                        return PumpEnd::ConsumerGone;
                    }
                }
                None => return PumpEnd::StreamEnded,
            }
        }
    }

    /// Resolve once the subscriber has dropped its half.
    pub async fn closed(&self) {
        self.logs.closed().await
    }

    /// Push a log to the subscriber, waiting for buffer space.
    ///
    /// Returns false once the subscriber has gone away.
    pub async fn deliver(&self, log: Log) -> bool {
        self.logs.send(log).await.is_ok()
    }

    /// Push a log without waiting. Returns false if the buffer is full or
    /// the subscriber is gone.
    pub fn try_deliver(&self, log: Log) -> bool {
        self.logs.try_send(log).is_ok()
    }

    /// Signal a transport-level failure and close the feed.
    pub fn fail(mut self, reason: impl Into<String>) {
        if let Some(tx) = self.failure.take() {
            let _ = tx.send(reason.into());
        }
    }

    /// Whether the subscriber has dropped its half.
    pub fn is_closed(&self) -> bool {
        self.logs.is_closed()
    }
}
