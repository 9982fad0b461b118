use actix_web::{
    HttpResponse, post,
    web::{Bytes, Data},
};
use fluxdash_k8s_backend::ReconcileError;
use serde::Deserialize;
use serde_json::Value;

use crate::routes::{ApiError, MessageResponse, parse_body, success};
use crate::startup::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub patch: Option<Value>,
}

#[post("/edit")]
pub async fn edit(state: Data<AppState>, body: Bytes) -> Result<HttpResponse, ApiError> {
    let request: EditRequest = parse_body(&body);
    let name = request
        .name
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::MissingField("name"))?;

    let patch = match request.patch {
        None | Some(Value::Null) => return Err(ApiError::MissingField("patch")),
        Some(Value::Object(patch)) => patch,
        Some(_) => return Err(ReconcileError::EmptyPatch.into()),
    };

    state.reconciler.edit(&name, &patch).await?;

    Ok(success(MessageResponse {
        message: format!("Kustomization '{name}' updated"),
    }))
}
