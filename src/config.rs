use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::audio::RangePolicy;
use crate::error::{AudioError, Result};

/// Tunables for a [`crate::pipeline::TrimPipeline`]
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "range": { "min_span_seconds": 0.1 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub range: RangePolicy,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AudioError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AudioError::FileOpen {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()
    }
}
