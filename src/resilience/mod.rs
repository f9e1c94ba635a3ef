//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Live subscription drops:
//!     → backoff.rs (fixed reconnect delay)
//!     → watcher resubscribes once; a second failure to subscribe is fatal
//! ```
//!
//! # Design Decisions
//! - Fixed delay, no jitter, no attempt limit
//! - No client-side timeouts; calls rely on the transport defaults

pub mod backoff;

pub use backoff::ReconnectBackoff;
