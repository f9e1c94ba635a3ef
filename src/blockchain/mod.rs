//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Private key (flag or PRIVATE_KEY env)
//!     → wallet.rs (key parsing, hash signing)
//! RPC URL
//!     → client.rs (alloy-backed RpcTransport)
//! (model id, input hash, output commitment)
//!     → abi.rs (verifyAndRecord call encoding)
//!     → transaction.rs (nonce + gas price, build legacy tx, sign, broadcast)
//! ```
//!
//! # Security Constraints
//! - Private keys never come from config files and are never logged
//! - Transactions are EIP-155 signed for the chain the node reports
//! - No client-side nonce cache: the pending nonce is read at signing time

pub mod abi;
pub mod client;
pub mod transaction;
pub mod transport;
pub mod types;
pub mod wallet;

pub use abi::{InferenceRecorded, verifyAndRecordCall};
pub use client::AlloyTransport;
pub use transaction::{AttestationRequest, AttestationSubmitter, SignedAttestation};
pub use transport::{LogSubscription, PumpEnd, RpcTransport, SubscriptionEvent, SubscriptionFeed};
pub use types::{BlockchainError, BlockchainResult, ChainId};
pub use wallet::Wallet;
