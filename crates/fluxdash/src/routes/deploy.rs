use actix_web::{
    HttpResponse, post,
    web::{Bytes, Data},
};
use serde::Deserialize;

use crate::routes::{ApiError, MessageResponse, parse_body, success};
use crate::startup::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeployRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[post("/deploy")]
pub async fn deploy(state: Data<AppState>, body: Bytes) -> Result<HttpResponse, ApiError> {
    let request: DeployRequest = parse_body(&body);
    let name = request
        .name
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::MissingField("name"))?;

    state.reconciler.trigger(&name).await?;

    Ok(success(MessageResponse {
        message: format!("Reconciliation of '{name}' triggered"),
    }))
}
