//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Default pipeline/model tag.
pub const DEFAULT_PIPELINE_TAG: &str = "DeltaSignal-v0.1";

/// Root configuration shared by the three tools.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AttestConfig {
    /// JSON-RPC endpoint settings.
    pub rpc: RpcConfig,

    /// Deployed settlement contract.
    pub settlement: SettlementConfig,

    /// Submitter settings.
    pub attestation: AttestationConfig,

    /// Event watcher settings.
    pub watcher: WatcherConfig,

    /// Mock x402 server settings.
    pub mock_server: MockServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Endpoint URL. The watcher needs a `ws://` URL for live streaming.
    pub url: String,

    /// When set, refuse to sign for any other chain.
    pub chain_id: Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            chain_id: None,
        }
    }
}

/// Settlement contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SettlementConfig {
    /// Address of the deployed contract (0x...).
    pub contract_address: String,
}

/// Attestation submitter configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AttestationConfig {
    /// Pipeline/version tag hashed into the model id.
    pub pipeline_tag: String,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            pipeline_tag: DEFAULT_PIPELINE_TAG.to_string(),
        }
    }
}

/// Event watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WatcherConfig {
    /// First block to replay; chain head when absent.
    pub from_block: Option<u64>,

    /// Fixed delay before resubscribing, in milliseconds.
    pub reconnect_delay_ms: u64,

    /// Buffered live logs between the node and the watch loop.
    pub channel_capacity: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            from_block: None,
            reconnect_delay_ms: 2000,
            channel_capacity: 64,
        }
    }
}

/// Mock x402 server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MockServerConfig {
    /// Bind address (e.g., "0.0.0.0:4021").
    pub bind_address: String,

    /// Address advertised as `payTo`.
    pub receiving_address: String,

    /// Payment network name.
    pub network: String,

    /// Price in atomic units (100000 = 0.10 USDC).
    pub max_amount: String,

    /// Asset symbol or token address.
    pub asset: String,

    /// Tag hashed into the reported model id.
    pub pipeline_tag: String,

    /// Seed for the fake transaction hash generator; entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4021".to_string(),
            receiving_address: "0x0000000000000000000000000000000000000000".to_string(),
            network: "base-sepolia".to_string(),
            max_amount: "100000".to_string(),
            asset: "USDC".to_string(),
            pipeline_tag: DEFAULT_PIPELINE_TAG.to_string(),
            rng_seed: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AttestConfig::default();
        assert_eq!(config.rpc.url, "http://localhost:8545");
        assert_eq!(config.attestation.pipeline_tag, "DeltaSignal-v0.1");
        assert_eq!(config.watcher.reconnect_delay_ms, 2000);
        assert_eq!(config.watcher.channel_capacity, 64);
        assert_eq!(config.mock_server.bind_address, "0.0.0.0:4021");
        assert_eq!(config.mock_server.max_amount, "100000");
        assert!(config.settlement.contract_address.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AttestConfig = toml::from_str(
            r#"
            [rpc]
            url = "ws://127.0.0.1:8546"

            [watcher]
            from_block = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc.url, "ws://127.0.0.1:8546");
        assert_eq!(config.rpc.chain_id, None);
        assert_eq!(config.watcher.from_block, Some(120));
        assert_eq!(config.watcher.reconnect_delay_ms, 2000);
        assert_eq!(config.mock_server, MockServerConfig::default());
    }
}
