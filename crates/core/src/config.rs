//! Pipeline configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "mode": "strict", "pagination": { "pageBudget": 3.9 } }
//! ```

use crate::decode::DecodeMode;
use crate::estimate::EstimatorConfig;
use crate::limits::ContentLimits;
use crate::paginate::PaginationConfig;
use serde::{Deserialize, Serialize};

/// Settings for the whole decode-and-paginate pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub mode: DecodeMode,
    /// Whether to run the paginator after decoding.
    pub paginate: bool,
    pub estimator: EstimatorConfig,
    pub limits: ContentLimits,
    pub pagination: PaginationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: DecodeMode::Lenient,
            paginate: true,
            estimator: EstimatorConfig::default(),
            limits: ContentLimits::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
