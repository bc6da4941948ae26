use serde::{Deserialize, Serialize};

/// Text of the envelope the gateway returns for every upstream failure.
pub const PREDICTION_FAILED: &str = "prediction failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn prediction_failed() -> Self {
        Self::new(PREDICTION_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_failed_envelope_shape() {
        let json = serde_json::to_value(ErrorEnvelope::prediction_failed()).expect("json");
        assert_eq!(json, serde_json::json!({ "error": "prediction failed" }));
    }
}
