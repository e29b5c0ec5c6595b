//! ConfigMap-backed label source
//!
//! Reads the `data` section of a single ConfigMap on every call, so edits to
//! the ConfigMap take effect for the next admitted pod without a restart.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tracing::debug;

use super::{validate_label_set, LabelSet, LabelSource, LabelSourceError};

/// Label source reading a ConfigMap through the Kubernetes API
#[derive(Clone)]
pub struct ConfigMapLabelSource {
    client: Client,
    namespace: String,
    name: String,
}

impl ConfigMapLabelSource {
    /// Create a source for the ConfigMap `namespace/name`
    pub fn new(client: Client, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

#[async_trait]
impl LabelSource for ConfigMapLabelSource {
    async fn fetch_labels(&self) -> Result<LabelSet, LabelSourceError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        let config_map = api.get_opt(&self.name).await?.ok_or_else(|| {
            LabelSourceError::NotFound(format!("configmap {}/{}", self.namespace, self.name))
        })?;

        let labels = labels_from_config_map(config_map)?;
        debug!(
            namespace = %self.namespace,
            name = %self.name,
            labels = labels.len(),
            "Loaded labels from ConfigMap"
        );
        Ok(labels)
    }
}

/// Extract a label set from a ConfigMap's `data`
///
/// A ConfigMap without `data` yields an empty set. `binaryData` is ignored.
pub fn labels_from_config_map(config_map: ConfigMap) -> Result<LabelSet, LabelSourceError> {
    let labels = config_map.data.unwrap_or_default();
    validate_label_set(&labels)?;
    Ok(labels)
}
