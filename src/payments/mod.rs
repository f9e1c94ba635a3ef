//! x402 pay-per-request types and the mock settlement pieces.
//!
//! Nothing here moves real funds: receipts are fabricated from an
//! explicitly passed random source so runs are reproducible when seeded.

pub mod receipts;
pub mod types;

pub use receipts::{fake_tx_hash, ReceiptSource};
pub use types::{AssetExtra, InsightCard, PaidInsight, PaymentRequiredBody, PaymentRequirements};
