//! Fabricated transaction hashes for the mock payment flow.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

use alloy::primitives::B256;

/// Draw a fake `0x` + 64 hex transaction hash from `rng`.
pub fn fake_tx_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 32] = rng.gen();
    B256::from(bytes).to_string()
}

/// Shared, explicitly owned random source for receipts.
#[derive(Debug, Clone)]
pub struct ReceiptSource {
    rng: Arc<Mutex<StdRng>>,
}

impl ReceiptSource {
    /// Deterministic source; equal seeds give equal sequences.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Next fake transaction hash.
    pub fn next_tx_hash(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        fake_tx_hash(&mut *rng)
    }
}
