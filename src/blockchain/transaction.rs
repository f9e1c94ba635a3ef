//! Attestation transaction building, signing, and broadcast.
//!
//! # Responsibilities
//! - Encode `verifyAndRecord(modelId, inputHash, outputCommitment)`
//! - Read the pending nonce and gas price live from the node
//! - Build and EIP-155 sign a legacy transaction
//! - Broadcast it and return the transaction hash (not a receipt)
//!
//! Every step aborts the whole submission on error; nothing is broadcast
//! unless signing succeeded. Submitting twice records two attestations.

use alloy::consensus::{TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::abi::verifyAndRecordCall;
use crate::blockchain::transport::RpcTransport;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::blockchain::wallet::Wallet;
use crate::identity::Digest32;

/// Gas limit attached to every attestation transaction.
pub const ATTESTATION_GAS_LIMIT: u64 = 300_000;

/// The three digests recorded by one attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationRequest {
    pub model_id: Digest32,
    pub input_hash: Digest32,
    pub output_commitment: Digest32,
}

impl AttestationRequest {
    /// ABI-encoded `verifyAndRecord` call data.
    pub fn calldata(&self) -> Bytes {
        verifyAndRecordCall {
            modelId: self.model_id.as_b256(),
            inputHash: self.input_hash.as_b256(),
            outputCommitment: self.output_commitment.as_b256(),
        }
        .abi_encode()
        .into()
    }
}

/// A signed, encoded attestation transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedAttestation {
    /// Hash of the signed transaction.
    pub tx_hash: TxHash,
    /// EIP-2718 encoding (plain RLP for legacy transactions).
    pub raw: Bytes,
    /// Sender derived from the signing key.
    pub from: Address,
    pub nonce: u64,
    pub gas_price: u128,
    pub chain_id: ChainId,
}

/// Build the unsigned legacy transaction for an attestation.
pub fn build_attestation_tx(
    contract: Address,
    request: &AttestationRequest,
    nonce: u64,
    gas_price: u128,
    chain_id: ChainId,
) -> TxLegacy {
    TxLegacy {
        chain_id: Some(chain_id.0),
        nonce,
        gas_price,
        gas_limit: ATTESTATION_GAS_LIMIT,
        to: TxKind::Call(contract),
        value: U256::ZERO,
        input: request.calldata(),
    }
}

/// Sign and encode an attestation transaction.
///
/// Deterministic for a given key and transaction (RFC 6979 nonces).
pub fn sign_attestation(wallet: &Wallet, tx: TxLegacy) -> BlockchainResult<SignedAttestation> {
    let nonce = tx.nonce;
    let gas_price = tx.gas_price;
    let chain_id = tx
        .chain_id
        .map(ChainId)
        .ok_or_else(|| BlockchainError::Wallet("Refusing to sign without a chain id".to_string()))?;

    let signed = wallet.sign_legacy(tx)?;
    let tx_hash = *signed.hash();
    let envelope = TxEnvelope::from(signed);

    Ok(SignedAttestation {
        tx_hash,
        raw: envelope.encoded_2718().into(),
        from: wallet.address(),
        nonce,
        gas_price,
        chain_id,
    })
}

/// Submits attestations to one settlement contract through a transport.
pub struct AttestationSubmitter<'a, T> {
    transport: &'a T,
    contract: Address,
    expected_chain_id: Option<u64>,
}

impl<'a, T: RpcTransport> AttestationSubmitter<'a, T> {
    /// Create a submitter for `contract`.
    pub fn new(transport: &'a T, contract: Address) -> Self {
        Self {
            transport,
            contract,
            expected_chain_id: None,
        }
    }

    /// Refuse to sign unless the node reports this chain id.
    pub fn with_expected_chain_id(mut self, chain_id: Option<u64>) -> Self {
        self.expected_chain_id = chain_id;
        self
    }

    /// Resolve chain id, nonce and gas price, then build and sign.
    ///
    /// Performs no broadcast.
    pub async fn prepare(
        &self,
        wallet: &Wallet,
        request: &AttestationRequest,
    ) -> BlockchainResult<SignedAttestation> {
        let chain_id = self.transport.chain_id().await?;
        if let Some(expected) = self.expected_chain_id {
            if expected != chain_id {
                return Err(BlockchainError::ChainMismatch {
                    expected,
                    actual: chain_id,
                });
            }
        }

        let from = wallet.address();
        let nonce = self.transport.pending_nonce(from).await?;
        let gas_price = self.transport.gas_price().await?;

        tracing::debug!(
            from = %from,
            nonce = nonce,
            gas_price = gas_price,
            chain_id = chain_id,
            "Building attestation transaction"
        );

        let tx = build_attestation_tx(self.contract, request, nonce, gas_price, ChainId(chain_id));
        sign_attestation(wallet, tx)
    }

    /// Sign and broadcast one attestation, returning its transaction hash.
    pub async fn submit(
        &self,
        wallet: &Wallet,
        request: &AttestationRequest,
    ) -> BlockchainResult<TxHash> {
        let signed = self.prepare(wallet, request).await?;
        let tx_hash = self.transport.send_raw_transaction(&signed.raw).await?;

        if tx_hash != signed.tx_hash {
            tracing::warn!(
                local = %signed.tx_hash,
                remote = %tx_hash,
                "Node returned a different transaction hash"
            );
        }

        metrics::counter!("attest_transactions_submitted_total").increment(1);
        tracing::info!(
            tx_hash = %tx_hash,
            contract = %self.contract,
            nonce = signed.nonce,
            "Attestation broadcast"
        );

        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::SignableTransaction;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::keccak256;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn request() -> AttestationRequest {
        AttestationRequest {
            model_id: crate::identity::model_id_from_tag("DeltaSignal-v0.1"),
            input_hash: crate::identity::hash_bytes(b"abc"),
            output_commitment: crate::identity::hash_bytes(b"out"),
        }
    }

    #[test]
    fn test_build_attestation_tx() {
        let contract = Address::repeat_byte(0x42);
        let tx = build_attestation_tx(contract, &request(), 9, 7, ChainId(31337));

        assert_eq!(tx.gas_limit, ATTESTATION_GAS_LIMIT);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.to, TxKind::Call(contract));
        assert_eq!(tx.chain_id, Some(31337));
        assert_eq!(tx.input, request().calldata());
    }

    #[test]
    fn test_signing_is_deterministic_and_recoverable() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let contract = Address::repeat_byte(0x42);

        let a = sign_attestation(
            &wallet,
            build_attestation_tx(contract, &request(), 1, 1_000_000_000, ChainId(31337)),
        )
        .unwrap();
        let b = sign_attestation(
            &wallet,
            build_attestation_tx(contract, &request(), 1, 1_000_000_000, ChainId(31337)),
        )
        .unwrap();
        assert_eq!(a.raw, b.raw);
        assert_eq!(a.tx_hash, keccak256(&a.raw));

        let decoded = TxEnvelope::decode_2718(&mut a.raw.as_ref()).unwrap();
        let TxEnvelope::Legacy(signed) = decoded else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(signed.tx().chain_id, Some(31337));
        assert_eq!(signed.tx().nonce, 1);
        let sender = signed
            .signature()
            .recover_address_from_prehash(&signed.tx().signature_hash())
            .unwrap();
        assert_eq!(sender, wallet.address());
    }

    #[test]
    fn test_chain_id_changes_signature() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let contract = Address::repeat_byte(0x42);
        let local = sign_attestation(
            &wallet,
            build_attestation_tx(contract, &request(), 0, 1, ChainId(31337)),
        )
        .unwrap();
        let mainnet = sign_attestation(
            &wallet,
            build_attestation_tx(contract, &request(), 0, 1, ChainId(1)),
        )
        .unwrap();
        assert_ne!(local.tx_hash, mainnet.tx_hash);
    }

    #[test]
    fn test_unsigned_chain_rejected() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut tx = build_attestation_tx(Address::ZERO, &request(), 0, 1, ChainId(1));
        tx.chain_id = None;
        assert!(matches!(
            sign_attestation(&wallet, tx),
            Err(BlockchainError::Wallet(_))
        ));
    }
}
