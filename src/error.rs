//! Error types for the rollout labeler process

use thiserror::Error;

/// Process-level errors raised while configuring and serving the webhook
///
/// Nothing in the admission path returns this type: review failures are
/// always folded into a denial. These errors are fatal at startup. Kubernetes
/// client construction is handled by the binary and never surfaces here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// TLS certificate or key could not be loaded
    #[error("TLS error: {0}")]
    Tls(String),

    /// The HTTPS server failed while running
    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a TLS error with the given message
    pub fn tls(msg: impl Into<String>) -> Self {
        Self::Tls(msg.into())
    }

    /// Create a server error with the given message
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}
