//! Destinations for decoded records.

use alloy::primitives::Address;
use tokio::sync::mpsc;

use crate::watcher::decode::InferenceRecord;

/// Receives every decoded record, in emission order.
pub trait EventSink: Send {
    /// Called once the start block is resolved, before any record.
    fn watching(&mut self, _contract: Address, _from_block: u64) {}

    fn deliver(&mut self, record: &InferenceRecord);
}

/// Prints each record as a human-readable announcement block.
#[derive(Debug, Default)]
pub struct StdoutSink {
    rpc_url: Option<String>,
}

impl StdoutSink {
    /// Sink whose banner names the endpoint being watched.
    pub fn for_endpoint(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: Some(rpc_url.into()),
        }
    }

    /// The line printed when watching starts.
    pub fn banner(&self, contract: Address, from_block: u64) -> String {
        let mut line = format!(
            "Watching InferenceRecorded on {} from block {}",
            contract.to_checksum(None),
            from_block
        );
        if let Some(rpc_url) = &self.rpc_url {
            line.push_str(&format!(" (rpc={})", rpc_url));
        }
        line
    }

    /// Render the announcement block for one record.
    pub fn render(record: &InferenceRecord) -> String {
        let block = record
            .block_number
            .map(|b| b.to_string())
            .unwrap_or_else(|| "pending".to_string());
        let tx = record
            .tx_hash
            .map(|h| h.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "\n[announcement] InferenceRecorded\n  \
             block        : {}\n  \
             tx           : {}\n  \
             modelId      : {}\n  \
             inputHash    : {}\n  \
             prover       : {}\n  \
             outputCommit : {}\n  \
             attestation  : {}",
            block,
            tx,
            record.model_id,
            record.input_hash,
            record.prover.to_checksum(None),
            record.output_commitment,
            record.attestation_id,
        )
    }
}

impl EventSink for StdoutSink {
    fn watching(&mut self, contract: Address, from_block: u64) {
        println!("{}", self.banner(contract, from_block));
    }

    fn deliver(&mut self, record: &InferenceRecord) {
        println!("{}", Self::render(record));
    }
}

impl EventSink for Vec<InferenceRecord> {
    fn deliver(&mut self, record: &InferenceRecord) {
        self.push(record.clone());
    }
}

impl EventSink for mpsc::UnboundedSender<InferenceRecord> {
    fn deliver(&mut self, record: &InferenceRecord) {
        if self.send(record.clone()).is_err() {
            tracing::debug!("Record receiver dropped");
        }
    }
}
