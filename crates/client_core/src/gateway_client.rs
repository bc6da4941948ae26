use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ErrorEnvelope,
    protocol::{PredictQuery, PredictionRequest, PredictionResult, PREDICT_ROUTE},
};
use url::Url;

use crate::{error::GatewayCallError, PredictionBackend};

/// Talks to the prediction gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    http: Client,
    predict_url: Url,
    query: PredictQuery,
}

impl HttpGatewayClient {
    pub fn new(gateway_url: &str) -> Result<Self> {
        Self::from_parts(Client::new(), gateway_url)
    }

    pub fn with_timeout(gateway_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Self::from_parts(http, gateway_url)
    }

    fn from_parts(http: Client, gateway_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            predict_url: predict_url(gateway_url)?,
            query: PredictQuery::default(),
        })
    }

    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.query.threshold = threshold;
        self
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }
}

fn predict_url(gateway_url: &str) -> Result<Url> {
    let gateway_url = gateway_url.trim();
    if !(gateway_url.starts_with("http://") || gateway_url.starts_with("https://")) {
        return Err(anyhow!("gateway_url must start with http:// or https://"));
    }
    let mut base =
        Url::parse(gateway_url).with_context(|| format!("invalid gateway url '{gateway_url}'"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(PREDICT_ROUTE.trim_start_matches('/'))
        .with_context(|| format!("failed to derive predict url from '{gateway_url}'"))
}

#[async_trait]
impl PredictionBackend for HttpGatewayClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, GatewayCallError> {
        let response = self
            .http
            .post(self.predict_url.clone())
            .query(&self.query)
            .json(request)
            .send()
            .await
            .map_err(GatewayCallError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let envelope = response.json::<ErrorEnvelope>().await.ok();
            return Err(GatewayCallError::Status { status, envelope });
        }

        let body = response
            .bytes()
            .await
            .map_err(GatewayCallError::Transport)?;
        serde_json::from_slice(&body).map_err(GatewayCallError::Decode)
    }
}

#[cfg(test)]
#[path = "tests/gateway_client_tests.rs"]
mod tests;
