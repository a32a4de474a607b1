//! Bridge configuration loaded from the embedding page.

use serde::{Deserialize, Serialize};

use crate::{error::BridgeError, host::CapabilityId};

/// Global symbol the web-channel glue probes for when no override is configured.
pub const DEFAULT_HOST_GLOBAL: &str = "qt";

/// Bridge settings, serialized as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Global object whose presence signals a native host integration point.
    pub host_global: String,
    /// Capabilities that always use the fallback adapter.
    pub fallback_capabilities: Vec<CapabilityId>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_global: DEFAULT_HOST_GLOBAL.to_string(),
            fallback_capabilities: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Parses a configuration document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] when `raw` is not a valid configuration document.
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| BridgeError::Config(e.to_string()))?;
        if config.host_global.trim().is_empty() {
            return Err(BridgeError::Config("hostGlobal must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Forces `capability` onto its fallback adapter.
    pub fn with_fallback(mut self, capability: CapabilityId) -> Self {
        if !self.fallback_capabilities.contains(&capability) {
            self.fallback_capabilities.push(capability);
        }
        self
    }

    /// Returns whether `capability` must use its fallback adapter regardless of the host.
    pub fn forces_fallback(&self, capability: CapabilityId) -> bool {
        self.fallback_capabilities.contains(&capability)
    }
}
