use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use std::env;
use std::error::Error;
use std::fmt;

use super::endpoints::{GatewayConfig, InferenceResponse, RawPrediction};
use super::DetectionGateway;

#[derive(Debug)]
pub enum GatewayError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::MissingApiKey(key_name) => {
                write!(f, "API key not found in environment: {}", key_name)
            }
            GatewayError::NetworkError(err) => write!(f, "Network error: {}", err),
            GatewayError::SerializationError(err) => {
                write!(f, "Unexpected detection response: {}", err)
            }
            GatewayError::ApiError { status, error_body } => {
                write!(f, "Detection API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::NetworkError(err) => Some(err),
            GatewayError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

// The request URL carries the API key, so it is dropped from the error.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::NetworkError(err.without_url())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::SerializationError(err)
    }
}

/// Client for a Roboflow-hosted object detection model.
#[derive(Debug, Clone)]
pub struct RoboflowGateway {
    client: Client,
    config: GatewayConfig,
}

impl RoboflowGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl DetectionGateway for RoboflowGateway {
    async fn detect(&self, image_bytes: &[u8]) -> Result<Vec<RawPrediction>, GatewayError> {
        let api_key = env::var(&self.config.api_key_env_var)
            .map_err(|_| GatewayError::MissingApiKey(self.config.api_key_env_var.clone()))?;

        let url = self.config.endpoint_url();
        // The hosted API takes the image as a base64 string in a form-encoded body.
        let payload = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let confidence = self.config.confidence_threshold.to_string();
        let overlap = self.config.overlap_threshold.to_string();

        tracing::info!(%url, bytes = image_bytes.len(), "sending image to detection model");

        let response = self
            .client
            .post(&url)
            .query(&[
                ("api_key", api_key.as_str()),
                ("confidence", confidence.as_str()),
                ("overlap", overlap.as_str()),
                ("format", "json"),
            ])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(GatewayError::ApiError { status, error_body });
        }

        let body = response.text().await?;
        tracing::debug!(%body, "raw detection response");
        let inference: InferenceResponse = serde_json::from_str(&body)?;
        tracing::info!(predictions = inference.predictions.len(), "detection finished");
        Ok(inference.predictions)
    }
}
