//! SPIFFE CSI injector - mutating admission webhook

use std::sync::Arc;

use clap::Parser;
use injector_mutation::PodMutator;
use injector_webhook::{serve, Admitter};
use tracing::info;

use spiffe_csi_injector::config::Settings;
use spiffe_csi_injector::telemetry::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();

    init_logging(&settings.log_config())?;

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("failed to install the aws-lc-rs crypto provider");
    }

    let server = settings.server_config();
    info!(
        addr = %server.addr,
        tls = server.tls.is_some(),
        "starting spiffe-csi-injector"
    );

    let admitter = Arc::new(Admitter::new(PodMutator::new()));
    serve(server, admitter).await?;
    Ok(())
}
