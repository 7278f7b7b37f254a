//! Engine configuration.

use crate::error::ChartResult;
use crate::history::DEFAULT_MAX_HISTORY;
use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for a [`Chart`](crate::Chart).
///
/// Every field has a default, so a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Maximum number of undo steps kept.
    pub max_history: usize,
    pub layout: LayoutConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            layout: LayoutConfig::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_json(json: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ChartResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }
}
