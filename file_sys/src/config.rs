//! Archive decryption configuration

use crate::ArchiveError;
use serde::{Deserialize, Serialize};

/// Distance in bytes from the start of the encrypted region to the payload
pub const DEFAULT_COUNTER_HEADER_OFFSET: u64 = 0x1000;

/// Block size of the counter-mode cipher
pub const CIPHER_BLOCK_SIZE: u64 = 16;

/// Decryption parameters for [`crate::IvfcArchive`]
///
/// The defaults match retail containers: an all-zero base key and a payload
/// that starts `0x1000` bytes into the encrypted region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvfcConfig {
    /// Byte distance added to the read offset before deriving the counter
    pub counter_header_offset: u64,
    /// AES-128 key used for the payload
    pub base_key: [u8; 16],
}

impl Default for IvfcConfig {
    fn default() -> Self {
        Self {
            counter_header_offset: DEFAULT_COUNTER_HEADER_OFFSET,
            base_key: [0; 16],
        }
    }
}

impl IvfcConfig {
    /// Parses a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ArchiveError> {
        let config: IvfcConfig =
            serde_json::from_str(json).map_err(|e| ArchiveError::InvalidConfig(e.to_string()))?;
        if config.counter_header_offset % CIPHER_BLOCK_SIZE != 0 {
            return Err(ArchiveError::InvalidConfig(format!(
                "counter_header_offset {:#x} is not block aligned",
                config.counter_header_offset
            )));
        }
        Ok(config)
    }
}
