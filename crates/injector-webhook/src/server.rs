//! Webhook listener
//!
//! The API server only talks to admission webhooks over TLS, so production
//! deployments mount a serving certificate and enable TLS. The plain HTTP
//! listener exists for local testing behind a TLS-terminating proxy.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tracing::info;

use crate::admission::Admitter;
use crate::error::WebhookError;
use crate::router::webhook_router;

/// Serving certificate location
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_path: PathBuf,
    /// PEM-encoded private key
    pub key_path: PathBuf,
}

/// Server configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind the server
    pub addr: SocketAddr,
    /// TLS settings; `None` serves plain HTTP
    pub tls: Option<TlsConfig>,
}

/// Serve the webhook until the listener fails
pub async fn serve(config: ServerConfig, admitter: Arc<Admitter>) -> Result<(), WebhookError> {
    let app = webhook_router(admitter);

    match config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .map_err(|e| {
                    WebhookError::Config(format!(
                        "failed to load TLS certificate {:?} / key {:?}: {}",
                        tls.cert_path, tls.key_path, e
                    ))
                })?;

            info!(addr = %config.addr, "starting webhook server with TLS");
            axum_server::bind_rustls(config.addr, tls_config)
                .serve(app.into_make_service())
                .await
                .map_err(|e| WebhookError::Server(e.to_string()))
        }
        None => {
            let listener = tokio::net::TcpListener::bind(config.addr)
                .await
                .map_err(|e| {
                    WebhookError::Server(format!("failed to bind {}: {}", config.addr, e))
                })?;

            info!(addr = %config.addr, "starting webhook server without TLS");
            axum::serve(listener, app)
                .await
                .map_err(|e| WebhookError::Server(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_certificate_is_a_config_error() {
        let config = ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            tls: Some(TlsConfig {
                cert_path: PathBuf::from("/nonexistent/tls.crt"),
                key_path: PathBuf::from("/nonexistent/tls.key"),
            }),
        };

        let err = serve(config, Arc::new(Admitter::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::Config(_)));
        assert!(err.to_string().contains("tls.crt"));
    }
}
