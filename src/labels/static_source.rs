//! Fixed label source

use async_trait::async_trait;

use super::{LabelSet, LabelSource, LabelSourceError};

/// Label source that always returns the same labels
#[derive(Debug, Clone, Default)]
pub struct StaticLabelSource {
    labels: LabelSet,
}

impl StaticLabelSource {
    /// Create a source returning `labels` on every call
    pub fn new(labels: LabelSet) -> Self {
        Self { labels }
    }
}

#[async_trait]
impl LabelSource for StaticLabelSource {
    async fn fetch_labels(&self) -> Result<LabelSet, LabelSourceError> {
        Ok(self.labels.clone())
    }
}

/// Parse a `key=value` label pair
///
/// The value may be empty and may itself contain `=`; the key may not be empty.
pub fn parse_label_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("label key is empty in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
