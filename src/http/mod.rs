//! Mock x402 HTTP server.
//!
//! # Data Flow
//! ```text
//! GET /insight/demo
//!     → no X-PAYMENT header  → 402 + payment requirements
//!     → X-PAYMENT present    → fake receipt, digests, 200 + card
//! ```

pub mod insight;
pub mod server;

pub use server::{AppState, MockServer};
