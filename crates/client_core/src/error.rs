use shared::{domain::Indicator, error::ErrorEnvelope};
use thiserror::Error;

/// Shown whenever the gateway call fails, whatever the cause.
pub const BACKEND_FAILED: &str = "request to backend failed";

/// Local form problems. Never reaches the network; the display text is what
/// the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("all fields must be filled")]
    MissingField(Indicator),
    #[error("all fields must be numeric")]
    NotNumeric(Indicator),
}

impl ValidationError {
    pub fn indicator(&self) -> Indicator {
        match self {
            ValidationError::MissingField(indicator) | ValidationError::NotNumeric(indicator) => {
                *indicator
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayCallError {
    #[error("gateway request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("gateway responded with {status}")]
    Status {
        status: reqwest::StatusCode,
        envelope: Option<ErrorEnvelope>,
    },
    #[error("gateway returned an invalid prediction body: {0}")]
    Decode(#[source] serde_json::Error),
}
