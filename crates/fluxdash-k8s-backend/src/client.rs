use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams};
use kube::{
    Client,
    api::{Api, ListParams},
};
use serde_json::Value;

use crate::error::ClusterError;

/// Coordinate of a custom resource type: API group, version, kind and plural.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomResourceRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl CustomResourceRef {
    pub fn new(group: &str, version: &str, kind: &str, plural: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
        }
    }

    fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

/// Cluster operations the dashboard needs.
///
/// Every method is a single remote call. Implementations must not retry or
/// cache; failures are reported through [`ClusterError`].
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError>;

    async fn list_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClusterError>;

    async fn list_stateful_sets(&self, namespace: &str)
    -> Result<Vec<StatefulSet>, ClusterError>;

    async fn get_custom_object(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, ClusterError>;

    async fn list_custom_objects(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
    ) -> Result<Vec<DynamicObject>, ClusterError>;

    /// Applies `patch` as a JSON merge patch (`application/merge-patch+json`).
    async fn merge_patch_custom_object(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), ClusterError>;
}

/// [`ClusterClient`] backed by a `kube` client.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    timeout: Duration,
}

impl KubeClusterClient {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Create a client from the local kubeconfig, falling back to the in-cluster
    /// service account.
    pub async fn try_default(timeout: Duration) -> Result<Self, ClusterError> {
        let client = Client::try_default()
            .await
            .map_err(|e| ClusterError::Config(e.to_string()))?;

        Ok(Self::new(client, timeout))
    }
}

/// Runs `call`, failing with [`ClusterError::Timeout`] once `timeout` elapses.
pub async fn with_timeout<T, F>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, ClusterError>
where
    F: Future<Output = Result<T, ClusterError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} exceeded {:?}", operation, timeout);
            Err(ClusterError::Timeout {
                operation,
                after: timeout,
            })
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        with_timeout(self.timeout, "list pods", async {
            api.list(&ListParams::default())
                .await
                .map(|list| list.items)
                .map_err(|e| ClusterError::from_kube(e, "pods", namespace))
        })
        .await
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        with_timeout(self.timeout, "list services", async {
            api.list(&ListParams::default())
                .await
                .map(|list| list.items)
                .map_err(|e| ClusterError::from_kube(e, "services", namespace))
        })
        .await
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        with_timeout(self.timeout, "list deployments", async {
            api.list(&ListParams::default())
                .await
                .map(|list| list.items)
                .map_err(|e| ClusterError::from_kube(e, "deployments", namespace))
        })
        .await
    }

    async fn list_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClusterError> {
        let api: Api<ReplicaSet> = Api::namespaced(self.client.clone(), namespace);
        with_timeout(self.timeout, "list replicasets", async {
            api.list(&ListParams::default())
                .await
                .map(|list| list.items)
                .map_err(|e| ClusterError::from_kube(e, "replicasets", namespace))
        })
        .await
    }

    async fn list_stateful_sets(
        &self,
        namespace: &str,
    ) -> Result<Vec<StatefulSet>, ClusterError> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        with_timeout(self.timeout, "list statefulsets", async {
            api.list(&ListParams::default())
                .await
                .map(|list| list.items)
                .map_err(|e| ClusterError::from_kube(e, "statefulsets", namespace))
        })
        .await
    }

    async fn get_custom_object(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, ClusterError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &resource.api_resource());
        with_timeout(self.timeout, "get custom object", async {
            api.get(name)
                .await
                .map_err(|e| ClusterError::from_kube(e, &resource.kind, name))
        })
        .await
    }

    async fn list_custom_objects(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
    ) -> Result<Vec<DynamicObject>, ClusterError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &resource.api_resource());
        with_timeout(self.timeout, "list custom objects", async {
            api.list(&ListParams::default())
                .await
                .map(|list| list.items)
                .map_err(|e| ClusterError::from_kube(e, &resource.plural, namespace))
        })
        .await
    }

    async fn merge_patch_custom_object(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), ClusterError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &resource.api_resource());
        with_timeout(self.timeout, "patch custom object", async {
            api.patch(name, &PatchParams::default(), &Patch::Merge(patch))
                .await
                .map(|_| ())
                .map_err(|e| ClusterError::from_kube(e, &resource.kind, name))
        })
        .await
    }
}
