use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, web::Data};
use fluxdash_k8s_backend::{ClusterClient, KustomizationRegistry, Reconciler};
use tracing_actix_web::TracingLogger;

use crate::config::DashboardConfig;
use crate::routes;

/// Everything a request handler needs. Built once at startup and shared read-only.
pub struct AppState {
    pub client: Arc<dyn ClusterClient>,
    pub registry: KustomizationRegistry,
    pub reconciler: Reconciler,
    pub default_kustomization: String,
}

impl AppState {
    pub fn new(client: Arc<dyn ClusterClient>, config: &DashboardConfig) -> Self {
        let registry = KustomizationRegistry::new(
            client.clone(),
            &config.control_namespace,
            &config.kustomization_version,
        );
        let reconciler = Reconciler::new(
            client.clone(),
            &config.control_namespace,
            &config.kustomization_version,
            config.trigger,
        )
        .with_patchable_fields(config.patchable_fields.iter().cloned());

        Self {
            client,
            registry,
            reconciler,
            default_kustomization: config.default_kustomization.clone(),
        }
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let state = Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(routes::configure)
            .app_data(state.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
