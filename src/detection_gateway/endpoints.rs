use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::nutrition::Detection;

pub const DEFAULT_API_URL: &str = "https://detect.roboflow.com";
pub const DEFAULT_MODEL_ID: &str = "calorie-detector-2";
pub const DEFAULT_MODEL_VERSION: u32 = 1;
pub const DEFAULT_API_KEY_ENV_VAR: &str = "ROBOFLOW_API_KEY";
/// Minimum confidence (percent) the hosted model reports.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 50;
/// Maximum box overlap (percent) before non-max suppression merges boxes.
pub const DEFAULT_OVERLAP_THRESHOLD: u8 = 25;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const DEFAULT_TAG_COUNT: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model_id: String,
    pub model_version: u32,
    /// Name of the environment variable holding the API key.
    pub api_key_env_var: String,
    pub confidence_threshold: u8,
    pub overlap_threshold: u8,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_version: DEFAULT_MODEL_VERSION,
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.model_id,
            self.model_version
        )
    }
}

/// A single prediction as returned by the hosted model.
///
/// Bounding-box fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    #[serde(default)]
    pub class: Option<String>,
    /// Fraction in [0, 1].
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub tags: Option<i64>,
}

impl RawPrediction {
    /// Converts to a [`Detection`], scaling confidence to a percentage and
    /// defaulting a missing tag count to one.
    pub fn into_detection(self) -> Detection {
        Detection::new(
            self.class.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            self.confidence.unwrap_or(0.0) * 100.0,
            self.tags.unwrap_or(DEFAULT_TAG_COUNT),
        )
    }
}

/// Response body of the hosted model. Timing and image metadata are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceResponse {
    pub predictions: Vec<RawPrediction>,
}
