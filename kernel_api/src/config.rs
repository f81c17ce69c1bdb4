//! Kernel configuration

use crate::{ClockRate, KernelError};
use serde::{Deserialize, Serialize};

/// Simulated kernel configuration
///
/// Every field has a default matching the emulated console, so an empty JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Clock used to convert guest delays into scheduler cycles
    pub clock: ClockRate,
    /// Maximum number of live handles in the handle table
    pub max_handles: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            clock: ClockRate::arm11(),
            max_handles: 4096,
        }
    }
}

impl KernelConfig {
    /// Parses a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, KernelError> {
        let config: KernelConfig =
            serde_json::from_str(json).map_err(|e| KernelError::InvalidConfig(e.to_string()))?;
        if config.max_handles == 0 {
            return Err(KernelError::InvalidConfig(
                "max_handles must be non-zero".to_string(),
            ));
        }
        Ok(config)
    }
}
