//! Fixed-size digest type and its hex representation.

use alloy::hex;
use alloy::primitives::B256;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while hashing files or parsing digests.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The file could not be opened or read.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The string is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// The decoded value is not exactly 32 bytes.
    #[error("Expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// A 32-byte cryptographic digest, displayed as `0x` + 64 lowercase hex chars.
///
/// Used for model ids, input hashes and output commitments alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digest32(B256);

impl Digest32 {
    /// Parse a `0x`-prefixed (or bare) hex string into a digest.
    ///
    /// Rejects malformed hex and any decoded length other than 32.
    pub fn parse(s: &str) -> IdentityResult<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(IdentityError::InvalidLength(bytes.len()));
        }
        Ok(Self(B256::from_slice(&bytes)))
    }

    /// The digest as an alloy word.
    pub fn as_b256(&self) -> B256 {
        self.0
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }
}

impl From<B256> for Digest32 {
    fn from(word: B256) -> Self {
        Self(word)
    }
}

impl From<Digest32> for B256 {
    fn from(digest: Digest32) -> Self {
        digest.0
    }
}

impl FromStr for Digest32 {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
