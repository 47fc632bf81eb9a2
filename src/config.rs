use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::parser::parse_json_file;

/// Settings of a translation session. Every field can be omitted in the JSON file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CanoniserConfig {
    /// Structural violations fail `canonise` instead of being attached to the result.
    pub strict_validation: bool,
    /// When disabled, any fidelity warning fails the translation with `FidelityLoss`.
    pub allow_fidelity_loss: bool,
    pub logging: LoggingConfig,
}

impl Default for CanoniserConfig {
    fn default() -> Self {
        CanoniserConfig { strict_validation: true, allow_fidelity_loss: true, logging: LoggingConfig::default() }
    }
}

impl CanoniserConfig {
    pub fn from_file(file_path: &str) -> Result<Self> {
        let config: CanoniserConfig = parse_json_file(file_path)?;
        log::debug!("Configuration loaded from '{}'", file_path);
        Ok(config)
    }

    /// Keeps violations for inspection instead of failing.
    pub fn lenient() -> Self {
        CanoniserConfig { strict_validation: false, ..Default::default() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is not set.
    pub level: String,
    pub directory: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string(), directory: "logs".to_string(), file: "canoniser.log".to_string() }
    }
}
