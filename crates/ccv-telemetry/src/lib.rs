//! # CCV Telemetry
//!
//! Observability bootstrap for the CCV provider.
//!
//! ## Components
//!
//! - Structured logging via `tracing-subscriber` (pretty or JSON)
//! - Prometheus text exposition of metrics registered by the provider's
//!   `metrics` feature
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ccv_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//!
//!     // Application code here
//! }
//! ```
//!
//! ## Logging Macros
//!
//! `log_event!` and `log_chain_event!` are for host code embedding the
//! provider (handshake glue, relayer adapters). They attach `subsystem`,
//! `chain_id` and `channel_id` fields in the same shape the provider core
//! emits with plain `tracing` calls. The calling crate needs `tracing` as a
//! dependency.
//!
//! ```rust
//! use ccv_telemetry::{log_chain_event, log_event};
//!
//! let chain = "consumer-1";
//! let channel = "channel-0";
//! log_chain_event!(info, "handshake", "channel confirmed", chain, channel, height = 42u64);
//! log_event!(warn, "relayer", "ack delivery retried", attempt = 2u32);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CCV_SERVICE_NAME` | `ccv-provider` | Service name in logs |
//! | `CCV_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honored) |
//! | `CCV_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CCV_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `CCV_NETWORK` | `testnet` | Network name |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metrics could not be gathered or encoded.
    #[error("Failed to encode metrics: {0}")]
    Metrics(String),

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.full_service_name(),
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Qualified service name telemetry was started for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// Encode every metric in the default Prometheus registry as text.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_without_registrations() {
        assert!(encode_metrics().is_ok());
    }

    #[test]
    fn test_init_twice_fails_second_time() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        let first = init_telemetry(config.clone());
        let second = init_telemetry(config);
        // The global subscriber can only be installed once per process.
        assert!(!(first.is_ok() && second.is_ok()));
        assert!(second.is_err());
    }
}
