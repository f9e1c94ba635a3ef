//! The watch loop.
//!
//! # Responsibilities
//! - Drive a session through `WatchState`, one transition per iteration
//! - Replay the bounded history, then stream live logs
//! - Replace the subscription wholesale when it fails
//! - Stop at the shutdown broadcast and release the subscription

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::blockchain::transport::{LogSubscription, RpcTransport, SubscriptionEvent};
use crate::blockchain::types::BlockchainError;
use crate::resilience::ReconnectBackoff;
use crate::watcher::decode::{decode_inference_log, LogOrigin};
use crate::watcher::sink::EventSink;
use crate::watcher::state::{StartBlock, WatchQuery, WatchState};

use alloy::rpc::types::Log;

/// Fatal watch errors. Recoverable conditions never surface here.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The chain head could not be read at watch start.
    #[error("Failed to resolve chain head: {0}")]
    Head(#[source] BlockchainError),

    /// The historical log query failed.
    #[error("Historical log query failed: {0}")]
    Query(#[source] BlockchainError),

    /// The first live subscription could not be opened.
    #[error("Log subscription failed: {0}")]
    Subscribe(#[source] BlockchainError),

    /// Subscribing again after a drop failed.
    #[error("Resubscribe failed on reconnect {attempt}: {source}")]
    Resubscribe {
        attempt: u32,
        #[source]
        source: BlockchainError,
    },
}

/// Counters for a finished watch session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchReport {
    /// Resolved start block.
    pub start_block: Option<u64>,
    /// Records emitted during the historical replay.
    pub historical: u64,
    /// Records emitted from the live subscription.
    pub live: u64,
    /// Logs skipped because they failed to decode.
    pub decode_failures: u64,
    /// Live logs skipped because the node flagged them as removed.
    pub removed: u64,
    /// Live logs skipped because the replay already emitted them.
    pub duplicates: u64,
    /// Successful resubscriptions.
    pub reconnects: u32,
}

/// Watches one contract for InferenceRecorded events.
pub struct EventWatcher<T, S> {
    transport: T,
    query: WatchQuery,
    sink: S,
    backoff: ReconnectBackoff,
    start_block: u64,
    session: Option<LogSubscription>,
    replay_high_water: Option<(u64, u64)>,
    report: WatchReport,
}

impl<T: RpcTransport, S: EventSink> EventWatcher<T, S> {
    /// Create a watcher with the default 2 second reconnect delay.
    pub fn new(transport: T, query: WatchQuery, sink: S) -> Self {
        Self {
            transport,
            query,
            sink,
            backoff: ReconnectBackoff::default(),
            start_block: 0,
            session: None,
            replay_high_water: None,
            report: WatchReport::default(),
        }
    }

    /// Override the reconnect policy.
    pub fn with_backoff(mut self, backoff: ReconnectBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run the session until shutdown or a fatal error.
    ///
    /// The shutdown signal is only observed while streaming; replay and
    /// the reconnect delay run to completion first.
    pub async fn run(
        &mut self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<WatchReport, WatchError> {
        let mut state = WatchState::Init;

        loop {
            tracing::trace!(state = state.name(), "Watcher transition");

            state = match state {
                WatchState::Init => self.init().await?,
                WatchState::HistoricalReplay { from, head } => {
                    self.replay(from, head).await?;
                    self.subscribe().await.map_err(WatchError::Subscribe)?;
                    WatchState::LiveStreaming
                }
                WatchState::LiveStreaming => self.stream(&mut shutdown).await,
                WatchState::Reconnecting { reason } => self.reconnect(reason).await?,
                WatchState::ShuttingDown => {
                    self.session = None;
                    tracing::info!(
                        historical = self.report.historical,
                        live = self.report.live,
                        reconnects = self.report.reconnects,
                        "Watcher shut down"
                    );
                    return Ok(self.report.clone());
                }
            };
        }
    }

    async fn init(&mut self) -> Result<WatchState, WatchError> {
        let head = self
            .transport
            .latest_block_number()
            .await
            .map_err(WatchError::Head)?;

        let from = match self.query.start {
            StartBlock::Number(n) => n,
            StartBlock::Latest => head,
        };
        self.start_block = from;
        self.report.start_block = Some(from);

        tracing::info!(
            contract = %self.query.contract,
            from_block = from,
            head = head,
            "Watching InferenceRecorded"
        );
        self.sink.watching(self.query.contract, from);

        Ok(WatchState::HistoricalReplay { from, head })
    }

    async fn replay(&mut self, from: u64, head: u64) -> Result<(), WatchError> {
        if from > head {
            tracing::debug!(from_block = from, head = head, "Start block is ahead of head, nothing to replay");
            return Ok(());
        }

        let filter = self.query.replay_filter(from, head);
        let logs = self
            .transport
            .filter_logs(&filter)
            .await
            .map_err(WatchError::Query)?;

        tracing::debug!(count = logs.len(), from_block = from, to_block = head, "Replaying history");

        for log in &logs {
            if let Some(position) = log_position(log) {
                self.replay_high_water = Some(match self.replay_high_water {
                    Some(hw) if hw > position => hw,
                    _ => position,
                });
            }
            self.emit(log, LogOrigin::Historical);
        }
        Ok(())
    }

    async fn subscribe(&mut self) -> Result<(), BlockchainError> {
        let filter = self.query.live_filter(self.start_block);
        let session = self.transport.subscribe_logs(&filter).await?;
        self.session = Some(session);
        Ok(())
    }

    async fn stream(&mut self, shutdown: &mut broadcast::Receiver<()>) -> WatchState {
        let Some(session) = self.session.as_mut() else {
            return WatchState::Reconnecting {
                reason: "no active subscription".to_string(),
            };
        };

        let event = tokio::select! {
            biased;
            _ = shutdown.recv() => None,
            event = session.next_event() => Some(event),
        };

        match event {
            None => WatchState::ShuttingDown,
            Some(SubscriptionEvent::Log(log)) => {
                self.on_live_log(&log);
                WatchState::LiveStreaming
            }
            Some(SubscriptionEvent::Failed(reason)) => WatchState::Reconnecting { reason },
        }
    }

    async fn reconnect(&mut self, reason: String) -> Result<WatchState, WatchError> {
        self.session = None;
        let attempt = self.report.reconnects + 1;

        tracing::warn!(
            reason = %reason,
            attempt = attempt,
            delay_ms = self.backoff.delay_for(attempt).as_millis() as u64,
            "Subscription lost, reconnecting"
        );
        metrics::counter!("attest_watch_reconnects_total").increment(1);

        self.backoff.wait(attempt).await;
        self.subscribe()
            .await
            .map_err(|source| WatchError::Resubscribe { attempt, source })?;

        self.report.reconnects = attempt;
        tracing::info!(attempt = attempt, "Resubscribed");
        Ok(WatchState::LiveStreaming)
    }

    fn on_live_log(&mut self, log: &Log) {
        if log.removed {
            tracing::warn!(
                block = ?log.block_number,
                tx_hash = ?log.transaction_hash,
                "Skipping log removed by reorg"
            );
            self.report.removed += 1;
            return;
        }

        if let (Some(hw), Some(position)) = (self.replay_high_water, log_position(log)) {
            if position <= hw {
                tracing::debug!(block = position.0, log_index = position.1, "Skipping log already replayed");
                self.report.duplicates += 1;
                return;
            }
        }

        self.emit(log, LogOrigin::Live);
    }

    fn emit(&mut self, log: &Log, origin: LogOrigin) {
        match decode_inference_log(log, origin) {
            Ok(record) => {
                let phase = match origin {
                    LogOrigin::Historical => {
                        self.report.historical += 1;
                        "historical"
                    }
                    LogOrigin::Live => {
                        self.report.live += 1;
                        "live"
                    }
                };
                metrics::counter!("attest_watch_events_total", "phase" => phase).increment(1);
                self.sink.deliver(&record);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable log");
                metrics::counter!("attest_watch_decode_failures_total").increment(1);
                self.report.decode_failures += 1;
            }
        }
    }

    /// Counters so far.
    pub fn report(&self) -> &WatchReport {
        &self.report
    }
}

fn log_position(log: &Log) -> Option<(u64, u64)> {
    Some((log.block_number?, log.log_index?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_position() {
        let mut log = Log::default();
        assert_eq!(log_position(&log), None);
        log.block_number = Some(5);
        assert_eq!(log_position(&log), None);
        log.log_index = Some(2);
        assert_eq!(log_position(&log), Some((5, 2)));
    }

    #[test]
    fn test_error_display() {
        let err = WatchError::Resubscribe {
            attempt: 3,
            source: BlockchainError::Rpc("connection refused".into()),
        };
        assert_eq!(
            err.to_string(),
            "Resubscribe failed on reconnect 3: RPC error: connection refused"
        );
    }
}
