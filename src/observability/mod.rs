//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, stderr)
//!     → metrics.rs (counters, optional Prometheus endpoint)
//!
//! stdout is reserved for the human-readable tool output.
//! ```

pub mod logging;
pub mod metrics;
