//! Form state and the submission state machine.

use std::sync::Arc;

use futures::FutureExt;
use shared::{
    domain::{Indicator, UnknownIndicator},
    protocol::PredictionResult,
};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::{
    error::{GatewayCallError, BACKEND_FAILED},
    form::FieldMap,
    PredictionBackend,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Loading,
    Succeeded(PredictionResult),
    Failed(String),
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Loading)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

type PredictionOutcome = Result<PredictionResult, GatewayCallError>;

struct InFlight {
    submission: u64,
    handle: JoinHandle<PredictionOutcome>,
}

/// Owns one form: its field values, its submission state and at most one
/// outstanding gateway call.
///
/// A new `submit` aborts the call still in flight, so the state always
/// reflects the latest submission. `submit` spawns onto the current tokio
/// runtime and must be called from within one.
pub struct FormController<B> {
    backend: Arc<B>,
    fields: FieldMap,
    state: SubmissionState,
    in_flight: Option<InFlight>,
    submissions: u64,
}

impl<B: PredictionBackend + 'static> FormController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            fields: FieldMap::new(),
            state: SubmissionState::Idle,
            in_flight: None,
            submissions: 0,
        }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn update_field(&mut self, indicator: Indicator, raw_value: impl Into<String>) {
        self.fields.set(indicator, raw_value);
    }

    pub fn update_field_by_name(
        &mut self,
        name: &str,
        raw_value: impl Into<String>,
    ) -> Result<(), UnknownIndicator> {
        let indicator = name.parse::<Indicator>()?;
        self.update_field(indicator, raw_value);
        Ok(())
    }

    pub fn submit(&mut self) {
        self.abort_in_flight();
        self.state = SubmissionState::Validating;

        let request = match self.fields.to_request() {
            Ok(request) => request,
            Err(err) => {
                debug!(indicator = %err.indicator(), error = %err, "form validation failed");
                self.state = SubmissionState::Failed(err.to_string());
                return;
            }
        };

        self.submissions += 1;
        let submission = self.submissions;
        self.state = SubmissionState::Loading;

        let backend = Arc::clone(&self.backend);
        let handle = tokio::spawn(async move { backend.predict(&request).await });
        debug!(submission, "prediction request issued");
        self.in_flight = Some(InFlight { submission, handle });
    }

    /// Waits for the outstanding call, if any, and applies its outcome.
    ///
    /// Cancel-safe: the handle stays in `in_flight` until it resolves, so a
    /// dropped `settle` leaves the call for a later `settle`/`poll_settled`.
    pub async fn settle(&mut self) -> &SubmissionState {
        if let Some(in_flight) = self.in_flight.as_mut() {
            let outcome = (&mut in_flight.handle).await;
            let submission = in_flight.submission;
            self.in_flight = None;
            self.apply(submission, outcome);
        }
        &self.state
    }

    /// Applies the outcome only when the call has already finished. Returns
    /// true when the state changed.
    pub fn poll_settled(&mut self) -> bool {
        let Some(mut in_flight) = self.in_flight.take() else {
            return false;
        };
        if !in_flight.handle.is_finished() {
            self.in_flight = Some(in_flight);
            return false;
        }
        match (&mut in_flight.handle).now_or_never() {
            Some(outcome) => {
                self.apply(in_flight.submission, outcome);
                true
            }
            None => {
                self.in_flight = Some(in_flight);
                false
            }
        }
    }

    pub async fn submit_and_settle(&mut self) -> &SubmissionState {
        self.submit();
        self.settle().await
    }

    fn apply(&mut self, submission: u64, outcome: Result<PredictionOutcome, JoinError>) {
        self.state = match outcome {
            Ok(Ok(result)) => {
                debug!(
                    submission,
                    prediction = result.prediction,
                    probability = result.probability,
                    "prediction received"
                );
                SubmissionState::Succeeded(result)
            }
            Ok(Err(err)) => {
                warn!(submission, error = %err, "prediction request failed");
                SubmissionState::Failed(BACKEND_FAILED.to_string())
            }
            Err(err) => {
                warn!(submission, error = %err, "prediction task did not complete");
                SubmissionState::Failed(BACKEND_FAILED.to_string())
            }
        };
    }
}

impl<B> FormController<B> {
    fn abort_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.handle.abort();
            debug!(
                submission = previous.submission,
                "aborted superseded prediction request"
            );
        }
    }
}

impl<B> Drop for FormController<B> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
