use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Indicator;

pub const PREDICT_ROUTE: &str = "/predict";
pub const UPSTREAM_PREDICT_PATH: &str = "predict/";

/// Body sent from the form to the gateway and relayed to the upstream model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest(pub BTreeMap<Indicator, f64>);

impl PredictionRequest {
    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        self.0.get(&indicator).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Indicator, f64)> for PredictionRequest {
    fn from_iter<T: IntoIterator<Item = (Indicator, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Optional query accepted by `POST /predict` and forwarded to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(deserialize_with = "bool_or_flag")]
    pub prediction: bool,
    pub probability: f64,
}

/// The model reports its class either as a JSON boolean or as `0`/`1`.
fn bool_or_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "prediction flag must be 0 or 1, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_accepts_boolean_and_integer_flags() {
        let from_bool: PredictionResult =
            serde_json::from_str(r#"{"prediction": true, "probability": 0.87}"#).expect("bool");
        assert!(from_bool.prediction);
        assert_eq!(from_bool.probability, 0.87);

        let from_int: PredictionResult =
            serde_json::from_str(r#"{"prediction": 0, "probability": 0.12}"#).expect("int");
        assert!(!from_int.prediction);

        let err = serde_json::from_str::<PredictionResult>(
            r#"{"prediction": 7, "probability": 0.5}"#,
        )
        .expect_err("out of range flag");
        assert!(err.to_string().contains("0 or 1"));
    }

    #[test]
    fn request_serializes_with_wire_names() {
        let request: PredictionRequest = [
            (Indicator::IndiceEndividamento, 0.4),
            (Indicator::DependenciaEmprestimos, 1.5),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "dependencia_emprestimos": 1.5,
                "indice_endividamento": 0.4,
            })
        );
    }

    #[test]
    fn empty_query_serializes_without_threshold() {
        let json = serde_json::to_value(PredictQuery::default()).expect("serialize");
        assert_eq!(json, serde_json::json!({}));
    }
}
