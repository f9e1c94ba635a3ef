//! InferenceRecorded event watcher.
//!
//! # Data Flow
//! ```text
//! WatchQuery (contract, start block)
//!     → runner.rs: Init (resolve start, build filter)
//!     → HistoricalReplay (one bounded eth_getLogs, head-capped)
//!     → LiveStreaming (eth_subscribe logs) ⇄ Reconnecting (fixed delay)
//!     → ShuttingDown on the shutdown broadcast
//! each log → decode.rs → InferenceRecord → sink.rs (stdout / channel)
//! ```
//!
//! # Design Decisions
//! - One owning loop, one dispatch point per iteration (`WatchState`)
//! - Historical events are always emitted before any live event
//! - Undecodable logs are reported and skipped; they never stop the loop
//! - A failed resubscription is fatal

pub mod decode;
pub mod runner;
pub mod sink;
pub mod state;

pub use decode::{decode_inference_log, DecodeError, InferenceRecord, LogOrigin};
pub use runner::{EventWatcher, WatchError, WatchReport};
pub use sink::{EventSink, StdoutSink};
pub use state::{StartBlock, WatchQuery, WatchState};
