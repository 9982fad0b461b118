use std::net::TcpListener;
use std::sync::Arc;

use color_eyre::eyre::{Context, eyre};

use fluxdash::config::DashboardConfig;
use fluxdash::startup::{AppState, run};
use fluxdash::tracing::init_tracing;
use fluxdash_k8s_backend::KubeClusterClient;

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    // Init Tracing
    color_eyre::install()?;
    let _guard = init_tracing()?;

    let config = DashboardConfig::load().wrap_err("failed to load configuration")?;
    tracing::info!(
        control_namespace = %config.control_namespace,
        kustomization_version = %config.kustomization_version,
        trigger = %config.trigger,
        "configuration loaded"
    );

    // Without credentials there is nothing to serve.
    let client = KubeClusterClient::try_default(config.request_timeout())
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialize Kubernetes client: {}", e);
            eyre!("K8s client init failed: {}", e)
        })?;
    tracing::info!("Kubernetes client initialized.");

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .wrap_err_with(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Listening on {}:{}", config.host, config.port);

    let state = AppState::new(Arc::new(client), &config);
    run(listener, state)?.await?;

    Ok(())
}
