//! Rollout labeler - mutating admission webhook entrypoint

use std::sync::Arc;

use clap::Parser;
use kube::Client;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rollout_labeler::config::{Cli, LabelSourceKind};
use rollout_labeler::labels::{
    ConfigMapLabelSource, HttpLabelSource, LabelSet, LabelSource, StaticLabelSource,
};
use rollout_labeler::server::{start_server, ServerConfig};
use rollout_labeler::webhook::WebhookState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Both reqwest and axum-server link rustls; pick the provider explicitly
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install rustls crypto provider: {:?}", e);
        std::process::exit(1);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    let labels = build_label_source(&cli).await?;
    let state = Arc::new(WebhookState::new(labels));

    let config = ServerConfig {
        addr: cli.listen_addr(),
        cert_path: cli.tls_cert.clone(),
        key_path: cli.tls_key.clone(),
    };

    tracing::info!(
        port = cli.port,
        label_source = ?cli.label_source,
        "Rollout labeler starting"
    );

    start_server(config, state).await?;
    Ok(())
}

/// Construct the label source selected on the command line
///
/// The Kubernetes client is only built for the config-map source; failing to
/// build it is fatal.
async fn build_label_source(cli: &Cli) -> anyhow::Result<Arc<dyn LabelSource>> {
    let source: Arc<dyn LabelSource> = match cli.label_source {
        LabelSourceKind::Static => {
            let labels: LabelSet = cli.static_labels.iter().cloned().collect();
            tracing::info!(labels = ?labels, "Using static label source");
            Arc::new(StaticLabelSource::new(labels))
        }
        LabelSourceKind::ConfigMap => {
            let name = cli
                .config_map
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--config-map is required"))?;
            let client = Client::try_default()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;
            tracing::info!(
                namespace = %cli.config_map_namespace,
                name = %name,
                "Using ConfigMap label source"
            );
            Arc::new(ConfigMapLabelSource::new(
                client,
                cli.config_map_namespace.clone(),
                name,
            ))
        }
        LabelSourceKind::Http => {
            let endpoint = cli
                .label_endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--label-endpoint is required"))?;
            let source = HttpLabelSource::new(endpoint, cli.label_timeout())
                .map_err(|e| anyhow::anyhow!("Failed to create HTTP label source: {}", e))?;
            tracing::info!(
                endpoint = %source.endpoint(),
                timeout = ?cli.label_timeout(),
                "Using HTTP label source"
            );
            Arc::new(source)
        }
    };
    Ok(source)
}
