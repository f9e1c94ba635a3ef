//! Startup orchestration shared by the binaries.
//!
//! Fail fast: any startup error is fatal. Order is config, then logging,
//! then the optional metrics exporter.

use std::path::Path;

use crate::config::{load_config, AttestConfig, ConfigError};
use crate::observability::{logging, metrics};

/// Load configuration (defaults when no file is given) and bring up
/// logging and metrics.
pub fn bootstrap(config_path: Option<&Path>) -> Result<AttestConfig, ConfigError> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => AttestConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    if let Some(path) = config_path {
        tracing::debug!(path = %path.display(), "Configuration loaded");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    Ok(config)
}
