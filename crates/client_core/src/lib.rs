use async_trait::async_trait;
use shared::protocol::{PredictionRequest, PredictionResult};

pub mod controller;
pub mod error;
pub mod form;
pub mod gateway_client;
pub mod render;

pub use controller::{FormController, SubmissionState};
pub use error::{GatewayCallError, ValidationError};
pub use form::FieldMap;
pub use gateway_client::HttpGatewayClient;
pub use render::render;

/// Where a validated form is sent for classification.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn predict(&self, request: &PredictionRequest)
        -> Result<PredictionResult, GatewayCallError>;
}

