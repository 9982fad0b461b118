use actix_web::{
    HttpResponse, get,
    web::{Data, Query},
};
use fluxdash_k8s_backend::ClusterStatus;
use serde::Deserialize;

use crate::routes::{ApiError, success};
use crate::startup::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ClusterStatusQuery {
    /// Kustomization whose target namespace is inspected.
    pub name: Option<String>,
}

#[get("/cluster-status")]
pub async fn cluster_status(
    state: Data<AppState>,
    query: Query<ClusterStatusQuery>,
) -> Result<HttpResponse, ApiError> {
    let name = query
        .into_inner()
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.default_kustomization.clone());

    let namespace = state.registry.resolve_target_namespace(&name).await?;
    let status = ClusterStatus::collect(state.client.as_ref(), &namespace).await?;

    Ok(success(status))
}
