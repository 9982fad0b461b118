use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header::ContentType},
    web::ServiceConfig,
};
use fluxdash_k8s_backend::{ClusterError, ReconcileError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub mod cluster_status;
pub mod deploy;
pub mod edit;
pub mod health_check;
pub mod index;
pub mod platforms;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(index::index)
        .service(health_check::health_check)
        .service(cluster_status::cluster_status)
        .service(platforms::platforms)
        .service(deploy::deploy)
        .service(edit::edit);
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct Success<T> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{"status": "success", ...body}` with HTTP 200.
pub fn success<T: Serialize>(body: T) -> HttpResponse {
    HttpResponse::Ok().json(Success {
        status: "success",
        body,
    })
}

/// Lenient body parsing: an empty or malformed body reads as "no fields supplied".
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing '{0}' in request")]
    MissingField(&'static str),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::Cluster(ClusterError::EmptyArgument(_))
            | ApiError::Reconcile(ReconcileError::EmptyPatch)
            | ApiError::Reconcile(ReconcileError::FieldNotPatchable(_))
            | ApiError::Reconcile(ReconcileError::Cluster(ClusterError::EmptyArgument(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Cluster(_) | ApiError::Reconcile(ReconcileError::Cluster(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("rejected request: {}", self);
        }

        let error_message = ErrorMessage {
            status: "error",
            message: self.to_string(),
        };
        let body =
            serde_json::to_string(&error_message).expect("failed to serialize error message");
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(body)
    }
}
