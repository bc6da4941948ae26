use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::value::RawValue;
use shared::{error::ErrorEnvelope, protocol::PredictQuery};
use thiserror::Error;
use tracing::{debug, error};

use crate::app_state::AppState;

#[derive(Debug, Error)]
pub(crate) enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to read upstream body: {0}")]
    Body(#[source] reqwest::Error),
}

impl UpstreamError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status { .. } => "upstream_status",
            UpstreamError::Body(_) => "upstream_body",
        }
    }

    fn upstream_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(status.as_u16()),
            UpstreamError::Transport(err) | UpstreamError::Body(err) => {
                err.status().map(|s| s.as_u16())
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct RelayedPrediction {
    content_type: HeaderValue,
    body: Bytes,
}

impl IntoResponse for RelayedPrediction {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Upstream error bodies are kept for logging up to this many bytes.
const MAX_LOGGED_BODY_BYTES: usize = 1024;

pub(crate) async fn handle_predict(
    State(state): State<Arc<AppState>>,
    query: Option<Query<PredictQuery>>,
    Json(payload): Json<Box<RawValue>>,
) -> Response {
    let query = match query {
        Some(Query(query)) => query,
        None => {
            debug!("ignoring unparseable predict query");
            PredictQuery::default()
        }
    };
    if !payload.get().trim_start().starts_with('{') {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            "request body must be a JSON object",
        )
            .into_response();
    }

    match forward_prediction(&state, &query, &payload).await {
        Ok(relayed) => relayed.into_response(),
        Err(err) => {
            error!(
                failure = err.kind(),
                upstream_status = err.upstream_status(),
                error = %err,
                "prediction request to upstream failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope::prediction_failed()),
            )
                .into_response()
        }
    }
}

async fn forward_prediction(
    state: &AppState,
    query: &PredictQuery,
    payload: &RawValue,
) -> Result<RelayedPrediction, UpstreamError> {
    debug!(
        upstream = %state.predict_url,
        body_bytes = payload.get().len(),
        threshold = query.threshold,
        "forwarding prediction request"
    );

    let response = state
        .http
        .post(state.predict_url.clone())
        .query(query)
        .header(header::CONTENT_TYPE, "application/json")
        .body(payload.get().to_owned())
        .send()
        .await
        .map_err(UpstreamError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = read_error_body(response).await;
        return Err(UpstreamError::Status { status, body });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let body = response.bytes().await.map_err(UpstreamError::Body)?;

    Ok(RelayedPrediction { content_type, body })
}

/// Reads at most `MAX_LOGGED_BODY_BYTES` of a failed response.
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut buf = Vec::new();
    while buf.len() <= MAX_LOGGED_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            _ => break,
        }
    }
    summarize_error_body(buf)
}

fn summarize_error_body(mut buf: Vec<u8>) -> String {
    let truncated = buf.len() > MAX_LOGGED_BODY_BYTES;
    buf.truncate(MAX_LOGGED_BODY_BYTES);
    let mut body = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        body.push_str("...");
    }
    body
}

#[cfg(test)]
#[path = "tests/predict_tests.rs"]
mod tests;
