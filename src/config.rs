//! Runtime configuration
//!
//! Every setting is a CLI flag with an environment variable fallback so the
//! webhook can be configured from a Deployment manifest alone.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use injector_webhook::{ServerConfig, TlsConfig};

use crate::telemetry::LogConfig;
use crate::{DEFAULT_HTTP_PORT, DEFAULT_TLS_PORT};

/// Mutating admission webhook that wires Pods to the SPIFFE CSI workload socket
#[derive(Parser, Debug, Clone)]
#[command(name = "spiffe-csi-injector", version, about, long_about = None)]
pub struct Settings {
    /// Serve HTTPS with the mounted certificate instead of plain HTTP
    #[arg(long, env = "TLS_ENABLED")]
    pub tls_enabled: bool,

    /// Path to the PEM serving certificate
    #[arg(long, env = "TLS_CERT", default_value = "/etc/webhook/certs/tls.crt")]
    pub tls_cert: PathBuf,

    /// Path to the PEM private key
    #[arg(long, env = "TLS_KEY", default_value = "/etc/webhook/certs/tls.key")]
    pub tls_key: PathBuf,

    /// Port for the HTTPS listener
    #[arg(long, env = "TLS_PORT", default_value_t = DEFAULT_TLS_PORT)]
    pub tls_port: u16,

    /// Port for the plain HTTP listener
    #[arg(long, env = "HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Log filter, either a level (`info`) or an `EnvFilter` directive
    #[arg(long, env = "LOG_LEVEL", default_value = "debug")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Settings {
    /// Listener configuration: TLS on the TLS port, or plain HTTP
    pub fn server_config(&self) -> ServerConfig {
        if self.tls_enabled {
            ServerConfig {
                addr: SocketAddr::from(([0, 0, 0, 0], self.tls_port)),
                tls: Some(TlsConfig {
                    cert_path: self.tls_cert.clone(),
                    key_path: self.tls_key.clone(),
                }),
            }
        } else {
            ServerConfig {
                addr: SocketAddr::from(([0, 0, 0, 0], self.http_port)),
                tls: None,
            }
        }
    }

    /// Logging configuration
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.log_json,
        }
    }
}
