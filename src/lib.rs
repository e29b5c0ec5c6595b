//! Rollout labeler - mutating admission webhook for Argo Rollouts pods
//!
//! Pods created by Argo Rollouts carry a `rollouts-pod-template-hash` label.
//! The webhook intercepts their admission and returns a JSON Patch adding or
//! replacing the labels supplied by an external label source, so every rollout
//! pod carries the authoritative ownership labels from the moment it exists.
//!
//! # Modules
//!
//! - [`webhook`] - Admission review handling, predicate and patch construction
//! - [`labels`] - Label source trait and implementations (static, ConfigMap, HTTP)
//! - [`config`] - Command-line and environment configuration
//! - [`server`] - HTTPS server hosting the webhook
//! - [`error`] - Error types for the process

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod labels;
pub mod server;
pub mod webhook;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Default port for the webhook HTTPS server
///
/// 8443 rather than 443 so the container does not need root privileges.
pub const DEFAULT_WEBHOOK_PORT: u16 = 8443;
