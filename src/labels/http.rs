//! HTTP label source
//!
//! Fetches labels from an external metadata service. The service must answer
//! `GET <endpoint>` with a JSON object of string values, e.g.
//! `{"team": "microservices"}`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{validate_label_set, LabelSet, LabelSource, LabelSourceError};

/// Default per-request timeout for the metadata service
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Label source backed by an HTTP endpoint
#[derive(Clone)]
pub struct HttpLabelSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLabelSource {
    /// Create a source for `endpoint` with the given request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LabelSourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LabelSourceError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The endpoint this source queries
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LabelSource for HttpLabelSource {
    async fn fetch_labels(&self) -> Result<LabelSet, LabelSourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LabelSourceError::Request(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LabelSourceError::NotFound(self.endpoint.clone()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LabelSourceError::Request(format!("{status} - {body}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LabelSourceError::Request(e.to_string()))?;
        let labels = decode_labels(&body)?;

        debug!(endpoint = %self.endpoint, labels = labels.len(), "Fetched labels");
        Ok(labels)
    }
}

/// Decode a metadata service response body into a label set
pub fn decode_labels(body: &[u8]) -> Result<LabelSet, LabelSourceError> {
    let labels: LabelSet = serde_json::from_slice(body)
        .map_err(|e| LabelSourceError::Invalid(format!("expected a JSON object of strings: {e}")))?;
    validate_label_set(&labels)?;
    Ok(labels)
}
