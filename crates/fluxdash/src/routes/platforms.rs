use actix_web::{HttpResponse, get, web::Data};
use fluxdash_k8s_backend::PlatformInfo;
use serde::Serialize;

use crate::routes::{ApiError, success};
use crate::startup::AppState;

#[derive(Debug, Serialize)]
pub struct PlatformsResponse {
    pub platforms: Vec<PlatformInfo>,
}

#[get("/platforms")]
pub async fn platforms(state: Data<AppState>) -> Result<HttpResponse, ApiError> {
    let platforms = state.registry.list().await?;

    Ok(success(PlatformsResponse { platforms }))
}
