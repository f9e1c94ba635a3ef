//! x402 wire types and the demo report payload.

use serde::{Deserialize, Serialize};

/// Version of the x402 protocol spoken by the mock server.
pub const X402_VERSION: u32 = 1;

/// Request header carrying the client's payment.
pub const PAYMENT_HEADER: &str = "x-payment";

/// Response header carrying the settlement receipt.
pub const PAYMENT_RESPONSE_HEADER: &str = "x-payment-response";

/// Token metadata advertised alongside the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetExtra {
    pub name: String,
    pub version: String,
}

/// One accepted way to pay for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    /// Price in the asset's atomic units.
    pub max_amount_required: String,
    pub resource: String,
    pub description: String,
    pub mime_type: String,
    pub pay_to: String,
    pub max_timeout_seconds: u64,
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<AssetExtra>,
}

/// Body of a `402 Payment Required` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub x402_version: u32,
    pub accepts: Vec<PaymentRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The synthetic report sold by the demo endpoint.
///
/// Fields are declared in lexicographic order; the serialized form is
/// hashed into the output commitment, so the order is part of the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightCard {
    pub company: String,
    pub report_id: String,
    pub risk_tier: String,
    pub signal: String,
}

impl InsightCard {
    pub fn demo() -> Self {
        Self {
            company: "DemoCo".to_string(),
            report_id: "demo-001".to_string(),
            risk_tier: "Critical".to_string(),
            signal: "Revenue restatement risk".to_string(),
        }
    }
}

/// The paid response: the card plus payment and attestation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidInsight {
    #[serde(flatten)]
    pub card: InsightCard,
    pub paid_via: String,
    pub payment_tx: String,
    pub payment_network: String,
    pub attest_tx: String,
    pub model_id: String,
    pub input_hash: String,
    pub output_commitment: String,
    pub generated_at: String,
}
