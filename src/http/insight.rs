//! The paid demo insight endpoint.

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{SecondsFormat, Utc};

use crate::http::server::AppState;
use crate::identity::{hash_bytes, model_id_from_tag, Digest32};
use crate::payments::types::{
    AssetExtra, InsightCard, PaidInsight, PaymentRequiredBody, PaymentRequirements,
    PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER, X402_VERSION,
};

const DESCRIPTION: &str = "DeltaSignal Demo Insight Card";
const MAX_TIMEOUT_SECONDS: u64 = 120;

/// `GET /insight/demo`
pub async fn insight_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Response {
    let paid = headers
        .get(PAYMENT_HEADER)
        .is_some_and(|value| !value.as_bytes().is_empty());

    if !paid {
        metrics::counter!("mock_x402_requests_total", "outcome" => "payment_required").increment(1);
        tracing::debug!(path = %uri.path(), "No payment header, returning requirements");
        return (
            StatusCode::PAYMENT_REQUIRED,
            Json(payment_required(&state, uri.path())),
        )
            .into_response();
    }

    let payment_tx = state.receipts.next_tx_hash();
    let attest_tx = state.receipts.next_tx_hash();
    let card = InsightCard::demo();

    let body = PaidInsight {
        output_commitment: output_commitment(&card).to_string(),
        input_hash: input_hash(query.as_deref().unwrap_or("")).to_string(),
        model_id: model_id_from_tag(&state.config.pipeline_tag).to_string(),
        card,
        paid_via: "x402".to_string(),
        payment_tx: payment_tx.clone(),
        payment_network: state.config.network.clone(),
        attest_tx,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    metrics::counter!("mock_x402_requests_total", "outcome" => "paid").increment(1);
    tracing::info!(payment_tx = %payment_tx, input_hash = %body.input_hash, "Served paid insight");

    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(&STANDARD.encode(payment_tx.as_bytes())) {
        response.headers_mut().insert(PAYMENT_RESPONSE_HEADER, value);
    }
    response
}

/// Requirements advertised for `resource`.
pub fn payment_required(state: &AppState, resource: &str) -> PaymentRequiredBody {
    PaymentRequiredBody {
        x402_version: X402_VERSION,
        accepts: vec![PaymentRequirements {
            scheme: "exact".to_string(),
            network: state.config.network.clone(),
            max_amount_required: state.config.max_amount.clone(),
            resource: resource.to_string(),
            description: DESCRIPTION.to_string(),
            mime_type: "application/json".to_string(),
            pay_to: state.config.receiving_address.clone(),
            max_timeout_seconds: MAX_TIMEOUT_SECONDS,
            asset: state.config.asset.clone(),
            extra: Some(AssetExtra {
                name: "USDC".to_string(),
                version: "EIP-3009".to_string(),
            }),
        }],
        error: None,
    }
}

/// Keccak-256 of the query string in canonical form.
pub fn input_hash(raw_query: &str) -> Digest32 {
    hash_bytes(canonical_query(raw_query).as_bytes())
}

/// Keccak-256 of the serialized card.
pub fn output_commitment(card: &InsightCard) -> Digest32 {
    // InsightCard always serializes; an empty commitment is never produced
    let bytes = serde_json::to_vec(card).unwrap_or_default();
    hash_bytes(&bytes)
}

/// Decode the query, sort by key (stable for repeated keys), re-encode.
///
/// Output matches Go's `url.Values.Encode`: unreserved set
/// `A-Z a-z 0-9 - _ . ~`, space as `+`.
pub fn canonical_query(raw_query: &str) -> String {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw_query.as_bytes())
        .into_owned()
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    // form-urlencoding keeps `*` and escapes `~`; swap both
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
        .replace('*', "%2A")
        .replace("%7E", "~")
}
