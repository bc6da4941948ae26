use std::collections::BTreeMap;

use shared::{domain::Indicator, protocol::PredictionRequest};

use crate::error::ValidationError;

/// Raw text typed for each indicator. All ten keys exist from construction on;
/// an empty string marks a field the user has not filled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    values: BTreeMap<Indicator, String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMap {
    pub fn new() -> Self {
        Self {
            values: Indicator::ALL
                .into_iter()
                .map(|indicator| (indicator, String::new()))
                .collect(),
        }
    }

    pub fn set(&mut self, indicator: Indicator, raw_value: impl Into<String>) {
        self.values.insert(indicator, raw_value.into());
    }

    pub fn get(&self, indicator: Indicator) -> &str {
        self.values
            .get(&indicator)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Indicator, &str)> + '_ {
        self.values
            .iter()
            .map(|(indicator, value)| (*indicator, value.as_str()))
    }

    pub fn unset(&self) -> impl Iterator<Item = Indicator> + '_ {
        self.iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(indicator, _)| indicator)
    }

    pub fn is_complete(&self) -> bool {
        self.unset().next().is_none()
    }

    /// Coerces every field to a number. Missing values are reported before
    /// unparseable ones so the user first learns the form is incomplete.
    pub fn to_request(&self) -> Result<PredictionRequest, ValidationError> {
        if let Some(indicator) = self.unset().next() {
            return Err(ValidationError::MissingField(indicator));
        }

        self.iter()
            .map(|(indicator, raw)| match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok((indicator, value)),
                _ => Err(ValidationError::NotNumeric(indicator)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FieldMap {
        let mut fields = FieldMap::new();
        for (i, indicator) in Indicator::ALL.into_iter().enumerate() {
            fields.set(indicator, format!("0.{i}5"));
        }
        fields
    }

    #[test]
    fn starts_with_every_indicator_unset() {
        let fields = FieldMap::new();
        assert_eq!(fields.iter().count(), Indicator::ALL.len());
        assert_eq!(fields.unset().count(), Indicator::ALL.len());
        assert!(!fields.is_complete());
    }

    #[test]
    fn whitespace_only_counts_as_unset() {
        let mut fields = filled();
        fields.set(Indicator::IndiceDespesasJuros, "   ");
        assert_eq!(
            fields.to_request(),
            Err(ValidationError::MissingField(Indicator::IndiceDespesasJuros))
        );
    }

    #[test]
    fn missing_field_reported_before_non_numeric() {
        let mut fields = filled();
        fields.set(Indicator::DependenciaEmprestimos, "abc");
        fields.set(Indicator::CaixaAtivosTotais, "");
        assert_eq!(
            fields.to_request(),
            Err(ValidationError::MissingField(Indicator::CaixaAtivosTotais))
        );
    }

    #[test]
    fn rejects_non_numeric_and_non_finite_values() {
        let mut fields = filled();
        fields.set(Indicator::ValorLiquidoAtivos, "12,5");
        assert_eq!(
            fields.to_request(),
            Err(ValidationError::NotNumeric(Indicator::ValorLiquidoAtivos))
        );

        fields.set(Indicator::ValorLiquidoAtivos, "inf");
        assert_eq!(
            fields.to_request(),
            Err(ValidationError::NotNumeric(Indicator::ValorLiquidoAtivos))
        );
    }

    #[test]
    fn complete_form_coerces_every_field() {
        let mut fields = filled();
        fields.set(Indicator::IndiceEndividamento, " -1e-3 ");
        let request = fields.to_request().expect("valid");
        assert_eq!(request.len(), Indicator::ALL.len());
        assert_eq!(request.get(Indicator::IndiceEndividamento), Some(-0.001));
        assert_eq!(request.get(Indicator::DependenciaEmprestimos), Some(0.05));
    }
}
