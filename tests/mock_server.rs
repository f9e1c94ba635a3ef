//! Mock x402 server over a loopback socket.

use std::net::SocketAddr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::net::TcpListener;

use dsverifier::config::MockServerConfig;
use dsverifier::http::MockServer;
use dsverifier::identity::{hash_bytes, model_id_from_tag};
use dsverifier::lifecycle::Shutdown;
use dsverifier::payments::{fake_tx_hash, PaymentRequiredBody};

async fn start_server(config: MockServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        MockServer::new(config).run(listener, signal).await.unwrap();
    });
    (addr, shutdown)
}

fn seeded(seed: u64) -> MockServerConfig {
    MockServerConfig {
        rng_seed: Some(seed),
        receiving_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
        ..Default::default()
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn is_hex32(value: &serde_json::Value) -> bool {
    let s = value.as_str().unwrap_or_default();
    s.len() == 66 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[tokio::test]
async fn test_unpaid_request_gets_402() {
    let (addr, shutdown) = start_server(seeded(1)).await;

    let res = client()
        .get(format!("http://{}/insight/demo?ticker=DEMO", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::PAYMENT_REQUIRED);

    let raw: serde_json::Value = res.json().await.unwrap();
    assert_eq!(raw["x402Version"], 1);
    let req = &raw["accepts"][0];
    assert_eq!(req["scheme"], "exact");
    assert_eq!(req["network"], "base-sepolia");
    assert_eq!(req["maxAmountRequired"], "100000");
    assert_eq!(req["resource"], "/insight/demo");
    assert_eq!(req["description"], "DeltaSignal Demo Insight Card");
    assert_eq!(req["mimeType"], "application/json");
    assert_eq!(req["payTo"], "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
    assert_eq!(req["maxTimeoutSeconds"], 120);
    assert_eq!(req["asset"], "USDC");
    assert_eq!(req["extra"]["name"], "USDC");
    assert_eq!(req["extra"]["version"], "EIP-3009");

    let typed: PaymentRequiredBody = serde_json::from_value(raw).unwrap();
    assert_eq!(typed.accepts.len(), 1);
    assert!(typed.error.is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_empty_payment_header_is_unpaid() {
    let (addr, shutdown) = start_server(seeded(1)).await;

    let res = client()
        .get(format!("http://{}/insight/demo", addr))
        .header("X-PAYMENT", "")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::PAYMENT_REQUIRED);

    shutdown.trigger();
}

#[tokio::test]
async fn test_paid_request_returns_card() {
    let (addr, shutdown) = start_server(seeded(9)).await;

    let res = client()
        .get(format!("http://{}/insight/demo?window=30d&ticker=DEMO", addr))
        .header("X-PAYMENT", "eyJwYXlsb2FkIjoibW9jayJ9")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let receipt = res
        .headers()
        .get("X-PAYMENT-RESPONSE")
        .expect("missing payment response header")
        .to_str()
        .unwrap()
        .to_string();
    let body: serde_json::Value = res.json().await.unwrap();

    assert_eq!(body["report_id"], "demo-001");
    assert_eq!(body["company"], "DemoCo");
    assert_eq!(body["signal"], "Revenue restatement risk");
    assert_eq!(body["risk_tier"], "Critical");
    assert_eq!(body["paid_via"], "x402");
    assert_eq!(body["payment_network"], "base-sepolia");
    for field in ["payment_tx", "attest_tx", "model_id", "input_hash", "output_commitment"] {
        assert!(is_hex32(&body[field]), "{} = {}", field, body[field]);
    }
    assert_ne!(body["payment_tx"], body["attest_tx"]);

    let decoded = STANDARD.decode(receipt).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), body["payment_tx"].as_str().unwrap());

    assert_eq!(
        body["model_id"].as_str().unwrap(),
        model_id_from_tag("DeltaSignal-v0.1").to_string()
    );
    assert_eq!(
        body["input_hash"].as_str().unwrap(),
        hash_bytes(b"ticker=DEMO&window=30d").to_string()
    );
    assert!(chrono::DateTime::parse_from_rfc3339(body["generated_at"].as_str().unwrap()).is_ok());

    shutdown.trigger();
}

#[tokio::test]
async fn test_same_seed_same_receipts() {
    let (a, stop_a) = start_server(seeded(42)).await;
    let (b, stop_b) = start_server(seeded(42)).await;
    let client = client();

    let mut bodies = Vec::new();
    for addr in [a, b] {
        let body: serde_json::Value = client
            .get(format!("http://{}/insight/demo", addr))
            .header("X-PAYMENT", "mock")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        bodies.push(body);
    }

    assert_eq!(bodies[0]["payment_tx"], bodies[1]["payment_tx"]);
    assert_eq!(bodies[0]["attest_tx"], bodies[1]["attest_tx"]);

    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    assert_eq!(bodies[0]["payment_tx"], fake_tx_hash(&mut rng));

    stop_a.trigger();
    stop_b.trigger();
}

#[tokio::test]
async fn test_health() {
    let (addr, shutdown) = start_server(seeded(1)).await;

    let res = client()
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(MockServer::new(seeded(1)).run(listener, shutdown.subscribe()));

    shutdown.trigger();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("server did not stop");
    assert!(result.unwrap().is_ok());
}
