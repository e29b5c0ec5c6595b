//! Mutating Admission Webhook for rollout pods
//!
//! Intercepts Pod admission reviews and, for pods created by Argo Rollouts
//! (identified by a `rollouts-pod-template-hash` label), returns a JSON Patch
//! that stamps the labels supplied by the configured [`LabelSource`].
//!
//! Every failure is answered with a well-formed `AdmissionReview`: the API
//! server treats a missing or malformed response as a webhook outage.

pub mod patch;
pub mod pod;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use kube::core::{
    admission::{AdmissionResponse, AdmissionReview},
    DynamicObject, TypeMeta,
};

use crate::labels::LabelSource;

/// API version of the admission reviews this webhook speaks
pub const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";

/// Kind of the admission review envelope
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

/// Shared state for webhook handlers
#[derive(Clone)]
pub struct WebhookState {
    /// Source of the labels applied to in-scope pods
    pub labels: Arc<dyn LabelSource>,
}

impl WebhookState {
    /// Create a new webhook state around the given label source
    pub fn new(labels: Arc<dyn LabelSource>) -> Self {
        Self { labels }
    }
}

/// Create the webhook router
///
/// - POST /mutate - Pod admission callback
/// - GET /healthz - Liveness check
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/mutate", post(pod::mutate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Errors detected before a review reaches the pod mutation logic
///
/// Each variant carries the UID recovered from the body, if any, so the
/// denial can still be matched to its request.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request body was empty
    #[error("Empty request body")]
    EmptyBody,

    /// The body did not decode as an AdmissionReview
    #[error("Could not unmarshal AdmissionReview")]
    InvalidReview {
        /// UID recovered from the raw body, empty when none was found
        uid: String,
        /// Decoder error, logged but not returned to the API server
        reason: String,
    },

    /// The review decoded but carried no request
    #[error("AdmissionReview has no request")]
    MissingRequest {
        /// UID recovered from the raw body, empty when none was found
        uid: String,
    },
}

impl WebhookError {
    /// UID to echo in the denial
    pub fn uid(&self) -> &str {
        match self {
            WebhookError::EmptyBody => "",
            WebhookError::InvalidReview { uid, .. } | WebhookError::MissingRequest { uid } => uid,
        }
    }

    /// Build the denial review answering this error
    pub fn into_review(self) -> AdmissionReview<DynamicObject> {
        let mut response = AdmissionResponse::invalid(self.to_string());
        response.uid = self.uid().to_string();
        response.types = review_type_meta();
        response.into_review()
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self.into_review())).into_response()
    }
}

/// TypeMeta of the outbound AdmissionReview envelope
pub fn review_type_meta() -> TypeMeta {
    TypeMeta {
        api_version: ADMISSION_API_VERSION.to_string(),
        kind: ADMISSION_REVIEW_KIND.to_string(),
    }
}
