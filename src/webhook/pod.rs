//! Pod Mutation Webhook
//!
//! Handles AdmissionReview requests for Pods, stamping labels from the label
//! source onto pods that carry a rollout template hash label.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use k8s_openapi::api::core::v1::Pod;
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
    DynamicObject,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{patch::build_label_patch, WebhookError, WebhookState};

/// Label key prefix marking a pod as created by a rollout
pub const ROLLOUT_HASH_LABEL_PREFIX: &str = "rollouts-pod-template-hash";

/// Kind handled by this webhook; everything else passes through
pub const POD_KIND: &str = "Pod";

/// An admission request whose object has not been decoded yet
///
/// The object stays raw until the kind is known, so an object that does not
/// fit the Pod schema is denied as a bad Pod and never fails the envelope.
#[derive(Debug)]
pub struct PodReview {
    /// The request with `object` and `oldObject` stripped
    pub request: AdmissionRequest<DynamicObject>,
    /// The raw `request.object`, absent or null mapped to `None`
    pub object: Option<Value>,
}

/// Decide whether a pod with these labels is in scope for mutation
///
/// True when any key starts with [`ROLLOUT_HASH_LABEL_PREFIX`]. Upstream
/// tooling may add a suffix to the key, so this is a prefix match.
pub fn should_mutate(labels: Option<&BTreeMap<String, String>>) -> bool {
    labels.is_some_and(|l| l.keys().any(|k| k.starts_with(ROLLOUT_HASH_LABEL_PREFIX)))
}

/// Handle mutating admission review for Pods
///
/// The body is taken raw so that an empty or undecodable review is still
/// answered with an AdmissionReview (HTTP 400) rather than an extractor error.
pub async fn mutate_handler(State(state): State<Arc<WebhookState>>, body: Bytes) -> Response {
    let review = match parse_review(&body) {
        Ok(review) => review,
        Err(e) => {
            match &e {
                WebhookError::InvalidReview { uid, reason } => {
                    error!(uid = %uid, error = %reason, "Failed to parse admission review")
                }
                other => error!(uid = %other.uid(), error = %other, "Rejecting admission review"),
            }
            return e.into_response();
        }
    };

    let response = mutate_pod(&state, &review).await;
    Json(response.into_review()).into_response()
}

/// Decode a request body into an admission request and its raw object
pub fn parse_review(body: &[u8]) -> Result<PodReview, WebhookError> {
    if body.is_empty() {
        return Err(WebhookError::EmptyBody);
    }

    let mut envelope: Value =
        serde_json::from_slice(body).map_err(|e| WebhookError::InvalidReview {
            uid: String::new(),
            reason: e.to_string(),
        })?;

    let object = envelope
        .get_mut("request")
        .and_then(Value::as_object_mut)
        .and_then(|request| {
            request.remove("oldObject");
            request.remove("object")
        })
        .filter(|object| !object.is_null());

    let review: AdmissionReview<DynamicObject> =
        serde_json::from_value(envelope).map_err(|e| WebhookError::InvalidReview {
            uid: recover_uid(body),
            reason: e.to_string(),
        })?;

    let request = review.try_into().map_err(|_| WebhookError::MissingRequest {
        uid: recover_uid(body),
    })?;

    Ok(PodReview { request, object })
}

/// Best-effort extraction of `request.uid` from a body that failed to decode
fn recover_uid(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/request/uid")?.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Decide a single admission request
///
/// Never fails: every error path becomes a denial carrying the request UID.
pub async fn mutate_pod(state: &WebhookState, review: &PodReview) -> AdmissionResponse {
    let request = &review.request;
    let uid = request.uid.as_str();

    if request.kind.kind != POD_KIND {
        debug!(uid = %uid, kind = %request.kind.kind, "Not a Pod, allowing unchanged");
        return AdmissionResponse::from(request);
    }

    let Some(obj) = &review.object else {
        debug!(uid = %uid, operation = ?request.operation, "No pod object in request, allowing unchanged");
        return AdmissionResponse::from(request);
    };

    let pod = match Pod::deserialize(obj) {
        Ok(pod) => pod,
        Err(e) => {
            warn!(uid = %uid, error = %e, "Could not decode pod");
            return AdmissionResponse::from(request).deny(format!("Could not unmarshal Pod: {e}"));
        }
    };

    let pod_name = pod
        .metadata
        .name
        .as_deref()
        .or(pod.metadata.generate_name.as_deref())
        .unwrap_or_default();
    let existing = pod.metadata.labels.as_ref();

    if !should_mutate(existing) {
        debug!(uid = %uid, pod = %pod_name, "No rollout template hash label, allowing unchanged");
        return AdmissionResponse::from(request);
    }

    let desired = match state.labels.fetch_labels().await {
        Ok(labels) => labels,
        Err(e) => {
            error!(uid = %uid, pod = %pod_name, error = %e, "Failed to fetch labels");
            return AdmissionResponse::from(request)
                .deny(format!("Error retrieving labels from API: {e}"));
        }
    };

    if desired.is_empty() {
        info!(uid = %uid, pod = %pod_name, "Label source returned no labels, allowing unchanged");
        return AdmissionResponse::from(request);
    }

    let patch_ops = build_label_patch(existing, &desired);

    info!(
        uid = %uid,
        pod = %pod_name,
        labels = desired.len(),
        patch_ops = patch_ops.len(),
        "Applying label patch to pod"
    );

    match AdmissionResponse::from(request).with_patch(json_patch::Patch(patch_ops)) {
        Ok(response) => response,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to serialize patch");
            AdmissionResponse::from(request).deny(format!("Could not marshal JSON patch: {e}"))
        }
    }
}
