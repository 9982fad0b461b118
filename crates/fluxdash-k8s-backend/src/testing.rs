//! In-memory [`ClusterClient`] for tests.
//!
//! Holds fixed object lists, records every call and every merge patch, and can
//! be told to fail one operation with a transport error.

use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStatus, ReplicaSet, ReplicaSetSpec, StatefulSet,
};
use k8s_openapi::api::core::v1::{Pod, PodStatus, Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use kube::api::DynamicObject;
use serde_json::{Value, json};

use crate::client::{ClusterClient, CustomResourceRef};
use crate::error::ClusterError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeOperation {
    ListPods,
    ListServices,
    ListDeployments,
    ListReplicaSets,
    ListStatefulSets,
    GetCustomObject,
    ListCustomObjects,
    MergePatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeCall {
    pub operation: FakeOperation,
    pub namespace: String,
    pub name: Option<String>,
}

impl FakeCall {
    pub fn new(operation: FakeOperation, namespace: &str, name: &str) -> Self {
        Self {
            operation,
            namespace: namespace.to_string(),
            name: Some(name.to_string()),
        }
    }

    pub fn list(operation: FakeOperation, namespace: &str) -> Self {
        Self {
            operation,
            namespace: namespace.to_string(),
            name: None,
        }
    }
}

#[derive(Default)]
pub struct FakeClusterClient {
    pods: Vec<Pod>,
    services: Vec<Service>,
    deployments: Vec<Deployment>,
    replica_sets: Vec<ReplicaSet>,
    stateful_sets: Vec<StatefulSet>,
    kustomizations: Vec<DynamicObject>,
    failure: Option<(FakeOperation, String)>,
    calls: Mutex<Vec<FakeCall>>,
    patches: Mutex<Vec<(String, String, Value)>>,
}

impl FakeClusterClient {
    pub fn with_pod(mut self, pod: Pod) -> Self {
        self.pods.push(pod);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_deployment(mut self, deployment: Deployment) -> Self {
        self.deployments.push(deployment);
        self
    }

    pub fn with_replica_set(mut self, replica_set: ReplicaSet) -> Self {
        self.replica_sets.push(replica_set);
        self
    }

    pub fn with_stateful_set(mut self, stateful_set: StatefulSet) -> Self {
        self.stateful_sets.push(stateful_set);
        self
    }

    pub fn with_kustomization(mut self, kustomization: DynamicObject) -> Self {
        self.kustomizations.push(kustomization);
        self
    }

    /// Make `operation` fail with a transport error carrying `message`.
    pub fn failing(mut self, operation: FakeOperation, message: &str) -> Self {
        self.failure = Some((operation, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// `(namespace, name, body)` of every accepted merge patch.
    pub fn patches(&self) -> Vec<(String, String, Value)> {
        self.patches.lock().unwrap().clone()
    }

    fn record(&self, call: FakeCall) -> Result<(), ClusterError> {
        let operation = call.operation;
        self.calls.lock().unwrap().push(call);

        match &self.failure {
            Some((failing, message)) if *failing == operation => {
                Err(ClusterError::Transport(message.clone()))
            }
            _ => Ok(()),
        }
    }
}

fn in_namespace<K: ResourceExt + Clone>(items: &[K], namespace: &str) -> Vec<K> {
    items
        .iter()
        .filter(|item| item.namespace().as_deref() == Some(namespace))
        .cloned()
        .collect()
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError> {
        self.record(FakeCall::list(FakeOperation::ListPods, namespace))?;
        Ok(in_namespace(&self.pods, namespace))
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError> {
        self.record(FakeCall::list(FakeOperation::ListServices, namespace))?;
        Ok(in_namespace(&self.services, namespace))
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError> {
        self.record(FakeCall::list(FakeOperation::ListDeployments, namespace))?;
        Ok(in_namespace(&self.deployments, namespace))
    }

    async fn list_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClusterError> {
        self.record(FakeCall::list(FakeOperation::ListReplicaSets, namespace))?;
        Ok(in_namespace(&self.replica_sets, namespace))
    }

    async fn list_stateful_sets(
        &self,
        namespace: &str,
    ) -> Result<Vec<StatefulSet>, ClusterError> {
        self.record(FakeCall::list(FakeOperation::ListStatefulSets, namespace))?;
        Ok(in_namespace(&self.stateful_sets, namespace))
    }

    async fn get_custom_object(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, ClusterError> {
        self.record(FakeCall::new(FakeOperation::GetCustomObject, namespace, name))?;
        in_namespace(&self.kustomizations, namespace)
            .into_iter()
            .find(|obj| obj.name_any() == name)
            .ok_or_else(|| ClusterError::NotFound {
                kind: resource.kind.clone(),
                name: name.to_string(),
            })
    }

    async fn list_custom_objects(
        &self,
        _resource: &CustomResourceRef,
        namespace: &str,
    ) -> Result<Vec<DynamicObject>, ClusterError> {
        self.record(FakeCall::list(FakeOperation::ListCustomObjects, namespace))?;
        Ok(in_namespace(&self.kustomizations, namespace))
    }

    async fn merge_patch_custom_object(
        &self,
        _resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), ClusterError> {
        self.record(FakeCall::new(FakeOperation::MergePatch, namespace, name))?;
        self.patches
            .lock()
            .unwrap()
            .push((namespace.to_string(), name.to_string(), patch.clone()));
        Ok(())
    }
}

fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..ObjectMeta::default()
    }
}

pub fn pod(namespace: &str, name: &str, phase: &str) -> Pod {
    Pod {
        metadata: meta(namespace, name),
        spec: None,
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..PodStatus::default()
        }),
    }
}

pub fn service(namespace: &str, name: &str, ports: &[i32]) -> Service {
    Service {
        metadata: meta(namespace, name),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            cluster_ip: Some("10.96.0.10".to_string()),
            ports: Some(
                ports
                    .iter()
                    .map(|port| ServicePort {
                        port: *port,
                        ..ServicePort::default()
                    })
                    .collect(),
            ),
            ..ServiceSpec::default()
        }),
        status: None,
    }
}

pub fn deployment(
    namespace: &str,
    name: &str,
    replicas: Option<i32>,
    ready_replicas: Option<i32>,
) -> Deployment {
    Deployment {
        metadata: meta(namespace, name),
        spec: Some(DeploymentSpec {
            replicas,
            ..DeploymentSpec::default()
        }),
        status: Some(DeploymentStatus {
            replicas,
            ready_replicas,
            ..DeploymentStatus::default()
        }),
    }
}

/// A replicaset with only `spec.replicas` set, or neither spec nor status.
pub fn replica_set(namespace: &str, name: &str, replicas: Option<i32>) -> ReplicaSet {
    ReplicaSet {
        metadata: meta(namespace, name),
        spec: replicas.map(|replicas| ReplicaSetSpec {
            replicas: Some(replicas),
            ..ReplicaSetSpec::default()
        }),
        status: None,
    }
}

/// A statefulset the controller has not reported on yet.
pub fn stateful_set(namespace: &str, name: &str) -> StatefulSet {
    StatefulSet {
        metadata: meta(namespace, name),
        spec: None,
        status: None,
    }
}

/// A Kustomization in `flux-system` with the given `spec` and `status` bodies.
/// A `null` status is left out entirely.
pub fn kustomization(name: &str, spec: Value, status: Value) -> DynamicObject {
    let mut data = json!({ "spec": spec });
    if !status.is_null() {
        data["status"] = status;
    }

    DynamicObject {
        types: None,
        metadata: meta("flux-system", name),
        data,
    }
}
