//! Command-line and environment configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::labels::parse_label_pair;
use crate::{Error, Result, DEFAULT_WEBHOOK_PORT};

/// Default TLS certificate path (mounted from the webhook's Secret)
pub const DEFAULT_TLS_CERT: &str = "/tls/tls.crt";

/// Default TLS private key path
pub const DEFAULT_TLS_KEY: &str = "/tls/tls.key";

/// Rollout labeler - stamps authoritative labels onto Argo Rollouts pods
#[derive(Parser, Debug, Clone)]
#[command(name = "rollout-labeler", version, about, long_about = None)]
pub struct Cli {
    /// HTTPS port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_WEBHOOK_PORT)]
    pub port: u16,

    /// PEM certificate served to the API server
    #[arg(long, env = "TLS_CERT_FILE", default_value = DEFAULT_TLS_CERT)]
    pub tls_cert: PathBuf,

    /// PEM private key for the certificate
    #[arg(long, env = "TLS_KEY_FILE", default_value = DEFAULT_TLS_KEY)]
    pub tls_key: PathBuf,

    /// Where labels come from
    #[arg(long, env = "LABEL_SOURCE", value_enum, default_value_t = LabelSourceKind::Static)]
    pub label_source: LabelSourceKind,

    /// Labels for the static source, as key=value (repeatable)
    #[arg(
        long = "label",
        env = "STATIC_LABELS",
        value_delimiter = ',',
        value_parser = parse_label_pair,
        default_value = "team=microservices"
    )]
    pub static_labels: Vec<(String, String)>,

    /// ConfigMap holding the labels (config-map source)
    #[arg(long, env = "LABEL_CONFIG_MAP")]
    pub config_map: Option<String>,

    /// Namespace of the label ConfigMap
    #[arg(long, env = "LABEL_CONFIG_MAP_NAMESPACE", default_value = "default")]
    pub config_map_namespace: String,

    /// URL of the label metadata service (http source)
    #[arg(long, env = "LABEL_ENDPOINT")]
    pub label_endpoint: Option<String>,

    /// Timeout for a single call to the label metadata service, in seconds
    #[arg(long, env = "LABEL_TIMEOUT_SECS", default_value_t = 5)]
    pub label_timeout_secs: u64,
}

/// Available label sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelSourceKind {
    /// Fixed labels from `--label`
    Static,
    /// Data of a ConfigMap in the cluster
    ConfigMap,
    /// JSON object from an HTTP endpoint
    Http,
}

impl Cli {
    /// Socket address to bind on all interfaces
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Request timeout for the http label source
    pub fn label_timeout(&self) -> Duration {
        Duration::from_secs(self.label_timeout_secs)
    }

    /// Check that the selected label source has what it needs
    pub fn validate(&self) -> Result<()> {
        match self.label_source {
            LabelSourceKind::ConfigMap if self.config_map.is_none() => Err(Error::config(
                "--config-map is required for the config-map label source",
            )),
            LabelSourceKind::Http if self.label_endpoint.is_none() => Err(Error::config(
                "--label-endpoint is required for the http label source",
            )),
            LabelSourceKind::Http if self.label_timeout_secs == 0 => {
                Err(Error::config("--label-timeout-secs must be greater than 0"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["rollout-labeler"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_explicit_flags() {
        let cli = parse(&[
            "--port",
            "9443",
            "--tls-cert",
            "/certs/c.pem",
            "--tls-key",
            "/certs/k.pem",
        ]);
        assert_eq!(cli.port, 9443);
        assert_eq!(cli.tls_cert, PathBuf::from("/certs/c.pem"));
        assert_eq!(cli.tls_key, PathBuf::from("/certs/k.pem"));
        assert_eq!(cli.listen_addr().port(), 9443);
        assert!(cli.listen_addr().ip().is_unspecified());
    }

    #[test]
    fn test_repeated_and_delimited_labels() {
        let cli = parse(&["--label", "team=payments", "--label", "tier=web,env=prod"]);
        assert_eq!(
            cli.static_labels,
            vec![
                ("team".to_string(), "payments".to_string()),
                ("tier".to_string(), "web".to_string()),
                ("env".to_string(), "prod".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_label_is_rejected() {
        let result = Cli::try_parse_from(["rollout-labeler", "--label", "no-separator"]);
        assert!(result.is_err());
    }

    /// Story: the static source always has labels, so there is nothing to validate
    #[test]
    fn story_static_source_falls_back_to_default_labels() {
        let cli = parse(&[]);
        assert_eq!(cli.label_source, LabelSourceKind::Static);
        assert_eq!(
            cli.static_labels,
            vec![("team".to_string(), "microservices".to_string())]
        );
        assert!(cli.validate().is_ok());

        // An empty label list never reaches validate
        assert!(Cli::try_parse_from(["rollout-labeler", "--label", ""]).is_err());
    }

    #[test]
    fn test_config_map_source_requires_name() {
        let cli = parse(&["--label-source", "config-map"]);
        assert_eq!(cli.label_source, LabelSourceKind::ConfigMap);
        let err = cli.validate().unwrap_err();
        assert!(err.to_string().contains("--config-map"));

        let cli = parse(&[
            "--label-source",
            "config-map",
            "--config-map",
            "rollout-labels",
            "--config-map-namespace",
            "platform",
        ]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.config_map_namespace, "platform");
    }

    #[test]
    fn test_http_source_requires_endpoint_and_timeout() {
        let cli = parse(&["--label-source", "http"]);
        assert!(cli.validate().is_err());

        let cli = parse(&[
            "--label-source",
            "http",
            "--label-endpoint",
            "http://metadata/labels",
            "--label-timeout-secs",
            "0",
        ]);
        assert!(cli.validate().unwrap_err().to_string().contains("greater than 0"));

        let cli = parse(&[
            "--label-source",
            "http",
            "--label-endpoint",
            "http://metadata/labels",
        ]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.label_timeout(), Duration::from_secs(5));
    }
}
