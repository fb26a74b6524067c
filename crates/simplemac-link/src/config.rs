use std::path::Path;

use serde::{Deserialize, Serialize};
use simplemac_frame::Address;
use simplemac_phy::PhyConfig;

use crate::error::{MacError, Result};

/// Maximum accepted size of a configuration file.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Node configuration.
///
/// Loaded from JSON, e.g.:
/// ```json
/// { "address": "0x0a0b", "phy": { "max_frame_size": 2048, "read_timeout": 500 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacConfig {
    /// This node's address. `None` leaves the MAC unconfigured.
    pub address: Option<Address>,
    /// Physical medium settings.
    pub phy: PhyConfig,
}

impl MacConfig {
    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config
            .phy
            .validate()
            .map_err(|err| MacError::Config(format!("phy: {err}")))?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|err| MacError::Config(format!("{}: {err}", path.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MacError::Config(format!(
                "{}: file too large ({} bytes, max {MAX_CONFIG_FILE_SIZE})",
                path.display(),
                metadata.len()
            )));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|err| MacError::Config(format!("{}: {err}", path.display())))?;
        Self::from_json(&text)
    }
}
