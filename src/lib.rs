//! DeltaSignal inference attestation tools.
//!
//! Hashes pipeline inputs and outputs, records them on an Ethereum
//! settlement contract, watches the resulting `InferenceRecorded` events,
//! and serves a mock x402 pay-per-request endpoint for demos.

// Core subsystems
pub mod blockchain;
pub mod identity;
pub mod watcher;

// Mock x402 server
pub mod http;
pub mod payments;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use blockchain::{AlloyTransport, AttestationRequest, AttestationSubmitter, RpcTransport, Wallet};
pub use config::AttestConfig;
pub use http::MockServer;
pub use identity::Digest32;
pub use lifecycle::Shutdown;
pub use watcher::{EventWatcher, WatchQuery};
