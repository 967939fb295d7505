//! Provider configuration and validation
//!
//! # Example
//!
//! ```
//! use qc_15_ccv_provider::ProviderConfig;
//!
//! let config = ProviderConfig::from_json(r#"{ "require_initializing_status": true }"#)
//!     .expect("valid config");
//! assert_eq!(config.port_id.as_str(), "provider");
//! assert!(config.require_initializing_status);
//! ```

use super::value_objects::{PortId, PROVIDER_PORT_ID};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config document did not parse.
    #[error("Invalid provider config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Port id must be non-empty.
    #[error("Provider port id must not be empty")]
    EmptyPortId,
}

/// CCV provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Port the provider module binds.
    pub port_id: PortId,
    /// Reject try-stage verification unless the channel is INITIALIZING.
    pub require_initializing_status: bool,
    /// Record version -> height at every block boundary.
    pub record_valset_heights: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            port_id: PortId::from(PROVIDER_PORT_ID),
            require_initializing_status: false,
            record_valset_heights: true,
        }
    }
}

impl ProviderConfig {
    /// Parse and validate a JSON config document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port_id.as_str().is_empty() {
            return Err(ConfigError::EmptyPortId);
        }
        Ok(())
    }
}
