//! Decoding raw logs into attestation records.

use alloy::primitives::{Address, TxHash, B256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::abi::InferenceRecorded;

/// A log that could not be decoded as InferenceRecorded.
#[derive(Debug, Error)]
#[error("Cannot decode log (block {block:?}, tx {tx_hash:?}): {reason}")]
pub struct DecodeError {
    pub block: Option<u64>,
    pub tx_hash: Option<TxHash>,
    pub reason: String,
}

/// Which phase of the watch produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOrigin {
    Historical,
    Live,
}

/// A decoded InferenceRecorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceRecord {
    pub origin: LogOrigin,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub tx_hash: Option<TxHash>,
    pub model_id: B256,
    pub input_hash: B256,
    pub output_commitment: B256,
    pub prover: Address,
    pub attestation_id: B256,
}

/// Decode an InferenceRecorded log.
///
/// Checks the event topic, the three indexed topics and the ABI-encoded
/// `(outputCommitment, attestationId)` payload.
pub fn decode_inference_log(log: &Log, origin: LogOrigin) -> Result<InferenceRecord, DecodeError> {
    let fail = |reason: String| DecodeError {
        block: log.block_number,
        tx_hash: log.transaction_hash,
        reason,
    };

    if log.topics().first() != Some(&InferenceRecorded::SIGNATURE_HASH) {
        return Err(fail("not an InferenceRecorded log".to_string()));
    }
    let decoded = log
        .log_decode::<InferenceRecorded>()
        .map_err(|e| fail(e.to_string()))?;
    let event = decoded.inner;

    Ok(InferenceRecord {
        origin,
        block_number: log.block_number,
        log_index: log.log_index,
        tx_hash: log.transaction_hash,
        model_id: event.modelId,
        input_hash: event.inputHash,
        output_commitment: event.outputCommitment,
        prover: event.prover,
        attestation_id: event.attestationId,
    })
}
