//! Watch session states and query definition.

use alloy::primitives::Address;
use alloy::rpc::types::Filter;
use alloy::sol_types::SolEvent;

use crate::blockchain::abi::InferenceRecorded;

/// Where a watch session starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartBlock {
    /// The chain head at watch-start time.
    #[default]
    Latest,
    /// An explicit block number.
    Number(u64),
}

impl StartBlock {
    /// Interpret a signed CLI value: negative means "latest".
    pub fn from_signed(value: i64) -> Self {
        u64::try_from(value).map(Self::Number).unwrap_or(Self::Latest)
    }
}

impl From<Option<u64>> for StartBlock {
    fn from(value: Option<u64>) -> Self {
        value.map(Self::Number).unwrap_or(Self::Latest)
    }
}

/// What to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchQuery {
    pub contract: Address,
    pub start: StartBlock,
}

impl WatchQuery {
    pub fn new(contract: Address, start: StartBlock) -> Self {
        Self { contract, start }
    }

    /// Filter for InferenceRecorded logs of the contract from `from_block`.
    ///
    /// Reissued unchanged for every subscription of a session.
    pub fn live_filter(&self, from_block: u64) -> Filter {
        Filter::new()
            .address(self.contract)
            .event_signature(InferenceRecorded::SIGNATURE_HASH)
            .from_block(from_block)
    }

    /// The live filter capped at `head` for the historical replay.
    pub fn replay_filter(&self, from_block: u64, head: u64) -> Filter {
        self.live_filter(from_block).to_block(head)
    }
}

/// States of a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    /// Resolve the start block.
    Init,
    /// Replay logs in `from..=head`.
    HistoricalReplay { from: u64, head: u64 },
    /// Wait on the live subscription.
    LiveStreaming,
    /// Subscription lost; wait and subscribe again.
    Reconnecting { reason: String },
    /// Terminal.
    ShuttingDown,
}

impl WatchState {
    pub fn name(&self) -> &'static str {
        match self {
            WatchState::Init => "init",
            WatchState::HistoricalReplay { .. } => "historical_replay",
            WatchState::LiveStreaming => "live_streaming",
            WatchState::Reconnecting { .. } => "reconnecting",
            WatchState::ShuttingDown => "shutting_down",
        }
    }
}
