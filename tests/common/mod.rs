//! Shared utilities for integration testing.
//!
//! `ScriptedTransport` answers every `RpcTransport` call from a script set
//! up by the test and records what the code under test asked for.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, TxHash, B256};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;

use dsverifier::blockchain::{
    BlockchainError, BlockchainResult, InferenceRecorded, LogSubscription, RpcTransport,
    SubscriptionFeed,
};

/// Anvil account #0.
pub const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Address of Anvil account #0.
pub const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// First contract deployed by Anvil account #0.
pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

pub fn contract() -> Address {
    CONTRACT.parse().unwrap()
}

/// How a scripted subscription ends once its logs are drained.
#[derive(Debug, Clone)]
pub enum Ending {
    /// Report a transport failure.
    Fail(String),
    /// Stay open until the watcher lets go.
    StayOpen,
}

/// One `subscribe_logs` call's outcome.
#[derive(Debug, Clone)]
pub enum SubscriptionScript {
    Deliver { logs: Vec<Log>, then: Ending },
    Refuse(String),
}

impl SubscriptionScript {
    pub fn open(logs: Vec<Log>) -> Self {
        Self::Deliver {
            logs,
            then: Ending::StayOpen,
        }
    }

    pub fn failing(logs: Vec<Log>, reason: &str) -> Self {
        Self::Deliver {
            logs,
            then: Ending::Fail(reason.to_string()),
        }
    }
}

#[derive(Default)]
struct Recorded {
    nonce: u64,
    sent: Vec<Bytes>,
    filter_queries: Vec<Filter>,
    subscriptions: Vec<Filter>,
    gas_price_calls: usize,
    open_feeds: Vec<SubscriptionFeed>,
    scripts: VecDeque<SubscriptionScript>,
}

/// Scripted JSON-RPC node.
pub struct ScriptedTransport {
    pub chain_id: u64,
    pub head: Result<u64, String>,
    pub gas_price: Result<u128, String>,
    pub history: Result<Vec<Log>, String>,
    pub broadcast_error: Option<String>,
    state: Mutex<Recorded>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            chain_id: 31337,
            head: Ok(0),
            gas_price: Ok(1_000_000_000),
            history: Ok(Vec::new()),
            broadcast_error: None,
            state: Mutex::new(Recorded::default()),
        }
    }

    pub fn with_head(mut self, head: u64) -> Self {
        self.head = Ok(head);
        self
    }

    pub fn with_history(mut self, logs: Vec<Log>) -> Self {
        self.history = Ok(logs);
        self
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        self.state.lock().unwrap().nonce = nonce;
        self
    }

    pub fn with_subscriptions(self, scripts: Vec<SubscriptionScript>) -> Self {
        self.state.lock().unwrap().scripts = scripts.into();
        self
    }

    /// Raw transactions accepted so far.
    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn filter_queries(&self) -> Vec<Filter> {
        self.state.lock().unwrap().filter_queries.clone()
    }

    /// Filters passed to `subscribe_logs`, one per call.
    pub fn subscriptions(&self) -> Vec<Filter> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    pub fn gas_price_calls(&self) -> usize {
        self.state.lock().unwrap().gas_price_calls
    }
}

impl RpcTransport for ScriptedTransport {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        Ok(self.chain_id)
    }

    async fn pending_nonce(&self, _address: Address) -> BlockchainResult<u64> {
        Ok(self.state.lock().unwrap().nonce)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.state.lock().unwrap().gas_price_calls += 1;
        self.gas_price.clone().map_err(BlockchainError::Rpc)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        if let Some(reason) = &self.broadcast_error {
            return Err(BlockchainError::Broadcast(reason.clone()));
        }
        let mut state = self.state.lock().unwrap();
        state.sent.push(Bytes::copy_from_slice(raw));
        state.nonce += 1;
        Ok(keccak256(raw))
    }

    async fn latest_block_number(&self) -> BlockchainResult<u64> {
        self.head.clone().map_err(BlockchainError::Rpc)
    }

    async fn filter_logs(&self, filter: &Filter) -> BlockchainResult<Vec<Log>> {
        self.state.lock().unwrap().filter_queries.push(filter.clone());
        self.history.clone().map_err(BlockchainError::Rpc)
    }

    async fn subscribe_logs(&self, filter: &Filter) -> BlockchainResult<LogSubscription> {
        let mut state = self.state.lock().unwrap();
        state.subscriptions.push(filter.clone());

        let script = state
            .scripts
            .pop_front()
            .unwrap_or(SubscriptionScript::open(Vec::new()));

        match script {
            SubscriptionScript::Refuse(reason) => Err(BlockchainError::Rpc(reason)),
            SubscriptionScript::Deliver { logs, then } => {
                let (feed, session) = LogSubscription::channel(logs.len() + 1);
                for log in logs {
                    assert!(feed.try_deliver(log), "scripted buffer too small");
                }
                match then {
                    Ending::Fail(reason) => feed.fail(reason),
                    Ending::StayOpen => state.open_feeds.push(feed),
                }
                Ok(session)
            }
        }
    }
}

/// An InferenceRecorded log; `seed` fills every event field.
pub fn inference_log(block: u64, log_index: u64, seed: u8) -> Log {
    let event = InferenceRecorded {
        modelId: B256::repeat_byte(seed),
        inputHash: B256::repeat_byte(seed.wrapping_add(1)),
        outputCommitment: B256::repeat_byte(seed.wrapping_add(2)),
        prover: Address::repeat_byte(seed),
        attestationId: B256::repeat_byte(seed.wrapping_add(3)),
    };
    Log {
        inner: alloy::primitives::Log {
            address: contract(),
            data: event.encode_log_data(),
        },
        block_number: Some(block),
        log_index: Some(log_index),
        transaction_hash: Some(TxHash::repeat_byte(seed)),
        ..Default::default()
    }
}

/// A log from the contract that is not an InferenceRecorded event.
pub fn foreign_log(block: u64, log_index: u64) -> Log {
    Log {
        inner: alloy::primitives::Log::new_unchecked(
            contract(),
            vec![B256::repeat_byte(0xee)],
            Bytes::new(),
        ),
        block_number: Some(block),
        log_index: Some(log_index),
        ..Default::default()
    }
}
