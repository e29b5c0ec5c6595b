//! Label sources
//!
//! A label source is the authority for the labels stamped onto rollout pods.
//! The webhook holds one behind [`LabelSource`] and calls it once per
//! in-scope review; it never caches or retries the result.
//!
//! Implementations:
//! - [`StaticLabelSource`] - fixed labels from configuration
//! - [`ConfigMapLabelSource`] - the `data` of a ConfigMap in the cluster
//! - [`HttpLabelSource`] - a JSON object served by an external metadata service

pub mod config_map;
pub mod http;
pub mod static_source;

use std::collections::BTreeMap;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use config_map::ConfigMapLabelSource;
pub use http::HttpLabelSource;
pub use static_source::{parse_label_pair, StaticLabelSource};

/// Authoritative label mapping, ordered by key
pub type LabelSet = BTreeMap<String, String>;

/// Errors returned by a label source
#[derive(Debug, thiserror::Error)]
pub enum LabelSourceError {
    /// The backing Kubernetes object could not be read
    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// The backing object or endpoint does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The external service could not be reached or answered with a failure
    #[error("request failed: {0}")]
    Request(String),

    /// The source answered with something that is not a valid label set
    #[error("invalid label set: {0}")]
    Invalid(String),
}

/// Supplies the labels to apply to in-scope pods
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Fetch the current label set
    async fn fetch_labels(&self) -> Result<LabelSet, LabelSourceError>;
}

/// Reject label sets that cannot be expressed as pod labels
pub fn validate_label_set(labels: &LabelSet) -> Result<(), LabelSourceError> {
    if labels.keys().any(|k| k.is_empty()) {
        return Err(LabelSourceError::Invalid(
            "label keys must be non-empty".to_string(),
        ));
    }
    Ok(())
}
