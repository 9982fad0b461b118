use std::sync::Arc;

use kube::ResourceExt;
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};

use crate::client::{ClusterClient, CustomResourceRef};
use crate::error::ClusterError;

pub const FLUX_KUSTOMIZE_GROUP: &str = "kustomize.toolkit.fluxcd.io";
pub const KUSTOMIZATION_KIND: &str = "Kustomization";
pub const KUSTOMIZATION_PLURAL: &str = "kustomizations";

const READY_CONDITION: &str = "Ready";
const UNKNOWN_STATUS: &str = "Unknown";

pub fn kustomization_resource(version: &str) -> CustomResourceRef {
    CustomResourceRef::new(
        FLUX_KUSTOMIZE_GROUP,
        version,
        KUSTOMIZATION_KIND,
        KUSTOMIZATION_PLURAL,
    )
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct KustomizationSpec {
    #[serde(default)]
    pub target_namespace: Option<String>,
    #[serde(default)]
    pub suspend: bool,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct KustomizationStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Deserialize, Default)]
struct KustomizationBody {
    #[serde(default)]
    spec: Option<KustomizationSpec>,
    #[serde(default)]
    status: Option<KustomizationStatus>,
}

/// The parts of a Flux Kustomization the dashboard reads.
#[derive(Clone, Debug, Default)]
pub struct Kustomization {
    pub name: String,
    pub spec: KustomizationSpec,
    pub status: KustomizationStatus,
}

impl Kustomization {
    pub fn from_dynamic(obj: DynamicObject) -> Result<Self, ClusterError> {
        let name = obj.name_any();
        let body: KustomizationBody =
            serde_json::from_value(obj.data).map_err(|source| ClusterError::Decode {
                kind: KUSTOMIZATION_KIND.to_string(),
                name: name.clone(),
                source,
            })?;

        Ok(Kustomization {
            name,
            spec: body.spec.unwrap_or_default(),
            status: body.status.unwrap_or_default(),
        })
    }

    /// First `Ready` condition, if reconciliation has reported one.
    pub fn ready_condition(&self) -> Option<&Condition> {
        self.status
            .conditions
            .iter()
            .find(|c| c.type_ == READY_CONDITION)
    }

    pub fn target_namespace_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.spec
            .target_namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(fallback)
    }
}

/// One row of the platforms listing.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub name: String,
    pub target_namespace: String,
    pub status: String,
    pub message: String,
}

#[derive(Clone)]
pub struct KustomizationRegistry {
    client: Arc<dyn ClusterClient>,
    resource: CustomResourceRef,
    control_namespace: String,
}

impl KustomizationRegistry {
    pub fn new(client: Arc<dyn ClusterClient>, control_namespace: &str, version: &str) -> Self {
        Self {
            client,
            resource: kustomization_resource(version),
            control_namespace: control_namespace.to_string(),
        }
    }

    pub fn control_namespace(&self) -> &str {
        &self.control_namespace
    }

    pub async fn get(&self, name: &str) -> Result<Kustomization, ClusterError> {
        if name.is_empty() {
            return Err(ClusterError::EmptyArgument("name"));
        }

        let obj = self
            .client
            .get_custom_object(&self.resource, &self.control_namespace, name)
            .await?;

        Kustomization::from_dynamic(obj)
    }

    pub async fn list(&self) -> Result<Vec<PlatformInfo>, ClusterError> {
        let objects = self
            .client
            .list_custom_objects(&self.resource, &self.control_namespace)
            .await?;

        objects
            .into_iter()
            .map(|obj| -> Result<PlatformInfo, ClusterError> {
                let ks = Kustomization::from_dynamic(obj)?;
                let (status, message) = match ks.ready_condition() {
                    Some(cond) => (cond.status.clone(), cond.message.clone()),
                    None => (UNKNOWN_STATUS.to_string(), String::new()),
                };

                Ok(PlatformInfo {
                    target_namespace: ks.target_namespace_or(&self.control_namespace).to_string(),
                    name: ks.name,
                    status,
                    message,
                })
            })
            .collect()
    }

    /// Namespace whose workloads `name` manages. Fails if `name` does not exist.
    pub async fn resolve_target_namespace(&self, name: &str) -> Result<String, ClusterError> {
        let ks = self.get(name).await?;

        Ok(ks.target_namespace_or(&self.control_namespace).to_string())
    }
}
