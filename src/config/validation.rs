//! Semantic validation, one entry point per tool.

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::AttestConfig;

/// A single semantic problem with the effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value was not supplied by file, environment or flag.
    #[error("missing required value: {0}")]
    Missing(&'static str),

    /// A value that must be an address does not parse as one.
    #[error("invalid address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    /// The RPC URL does not parse.
    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// A numeric setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Checks shared by the submitter and the watcher.
pub fn validate_chain_access(config: &AttestConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_rpc(config, &mut errors);
    check_contract(config, &mut errors);
    finish(errors)
}

/// Checks for the watcher.
pub fn validate_watcher(config: &AttestConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_rpc(config, &mut errors);
    check_contract(config, &mut errors);
    if config.watcher.channel_capacity == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "watcher.channel_capacity",
            reason: "must be at least 1".to_string(),
        });
    }
    finish(errors)
}

/// Checks for the mock x402 server.
pub fn validate_mock_server(config: &AttestConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &config.mock_server;
    if server.receiving_address.parse::<Address>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "mock_server.receiving_address",
            value: server.receiving_address.clone(),
        });
    }
    if server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::OutOfRange {
            field: "mock_server.bind_address",
            reason: format!("'{}' is not a socket address", server.bind_address),
        });
    }
    finish(errors)
}

/// Parse the configured contract address.
pub fn contract_address(config: &AttestConfig) -> Result<Address, ValidationError> {
    let raw = config.settlement.contract_address.trim();
    if raw.is_empty() {
        return Err(ValidationError::Missing("contract"));
    }
    raw.parse().map_err(|_| ValidationError::InvalidAddress {
        field: "contract",
        value: raw.to_string(),
    })
}

fn check_rpc(config: &AttestConfig, errors: &mut Vec<ValidationError>) {
    if config.rpc.url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidUrl(config.rpc.url.clone()));
    }
}

fn check_contract(config: &AttestConfig, errors: &mut Vec<ValidationError>) {
    if let Err(e) = contract_address(config) {
        errors.push(e);
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
