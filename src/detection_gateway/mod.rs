pub mod connection;
pub mod endpoints;

use async_trait::async_trait;

pub use connection::{GatewayError, RoboflowGateway};
pub use endpoints::{GatewayConfig, RawPrediction};

/// Sends the bytes of a meal photo to an object detection model.
#[async_trait]
pub trait DetectionGateway: Send + Sync {
    async fn detect(&self, image_bytes: &[u8]) -> Result<Vec<RawPrediction>, GatewayError>;
}
