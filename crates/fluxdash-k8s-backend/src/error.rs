use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("unable to initialize kubernetes client - please verify you can access the cluster: {0}")]
    Config(String),
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },
    #[error("kubernetes api error ({code}): {message}")]
    Api { code: u16, message: String },
    #[error("kubernetes transport error: {0}")]
    Transport(String),
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("unable to decode {kind} \"{name}\": {source}")]
    Decode {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),
}

impl ClusterError {
    /// Classifies a `kube` failure, keeping the resource identity for 404s.
    pub fn from_kube(err: kube::Error, kind: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => ClusterError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            kube::Error::Api(response) => ClusterError::Api {
                code: response.code,
                message: response.message,
            },
            other => ClusterError::Transport(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("patch must be a non-empty JSON object")]
    EmptyPatch,
    #[error("field '{0}' is not patchable")]
    FieldNotPatchable(String),
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}
