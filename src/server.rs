//! HTTPS server for the webhook

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tracing::info;

use crate::webhook::{webhook_router, WebhookState};
use crate::{Error, Result};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the server
    pub addr: SocketAddr,
    /// TLS certificate PEM file
    pub cert_path: PathBuf,
    /// TLS private key PEM file
    pub key_path: PathBuf,
}

/// Load the TLS certificate and key
pub async fn load_tls_config(config: &ServerConfig) -> Result<RustlsConfig> {
    RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| {
            Error::tls(format!(
                "failed to load {} / {}: {}",
                config.cert_path.display(),
                config.key_path.display(),
                e
            ))
        })
}

/// Serve the webhook over HTTPS until the server stops
pub async fn start_server(config: ServerConfig, state: Arc<WebhookState>) -> Result<()> {
    let tls_config = load_tls_config(&config).await?;
    let app = webhook_router(state);

    info!(addr = %config.addr, "Starting webhook server");

    axum_server::bind_rustls(config.addr, tls_config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| Error::server(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_certificate_is_tls_error() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            cert_path: PathBuf::from("/nonexistent/tls.crt"),
            key_path: PathBuf::from("/nonexistent/tls.key"),
        };

        let err = load_tls_config(&config).await.unwrap_err();
        assert!(matches!(err, Error::Tls(_)));
        assert!(err.to_string().contains("/nonexistent/tls.crt"));
    }
}
