//! Content hashing and identity derivation.
//!
//! # Data Flow
//! ```text
//! input/output files ──▶ hash.rs (Keccak-256, streamed) ──▶ Digest32
//! pipeline tag       ──▶ hash.rs (Keccak-256 of UTF-8)   ──▶ Digest32 (model id)
//! "0x…" strings      ──▶ digest.rs (Hex32 parsing)       ──▶ Digest32
//! ```
//!
//! # Design Decisions
//! - Keccak-256 (the Ethereum variant), never the standardized SHA3-256
//! - Digests are fixed 32-byte values; length is enforced at parse time

pub mod digest;
pub mod hash;

pub use digest::{Digest32, IdentityError, IdentityResult};
pub use hash::{hash_bytes, hash_file, hash_reader, model_id_from_tag};
