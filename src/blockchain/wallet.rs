//! Wallet management and transaction signing.
//!
//! # Security
//! - Keys come from the command line or the `PRIVATE_KEY` environment variable
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, Signed, TxLegacy};
use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// Signing wallet.
///
/// Holds no nonce state; the submitter reads the pending nonce from the node
/// for every transaction.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "Wallet loaded");

        Ok(Self { signer })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte prehash.
    pub fn sign_hash(&self, hash: &B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))
    }

    /// Sign a legacy transaction.
    ///
    /// The signature hash includes the transaction's chain id (EIP-155), so
    /// the result cannot be replayed on another network.
    pub fn sign_legacy(&self, tx: TxLegacy) -> BlockchainResult<Signed<TxLegacy>> {
        let signature = self.sign_hash(&tx.signature_hash())?;
        Ok(tx.into_signed(signature))
    }
}
