use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Pod, Service};

use kube::ResourceExt;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PodConditionInfo {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub phase: String,
    pub node: String,
    pub containers: Vec<String>,
    pub conditions: Vec<PodConditionInfo>,
}

impl From<Pod> for PodInfo {
    fn from(pod: Pod) -> Self {
        let name = pod.name_any();

        let (node, containers) = match pod.spec {
            Some(spec) => (
                spec.node_name.unwrap_or_default(),
                spec.containers.into_iter().map(|c| c.name).collect(),
            ),
            None => (String::new(), Vec::new()),
        };

        let (phase, conditions) = match pod.status {
            Some(status) => (
                status.phase.unwrap_or_else(|| "Unknown".into()),
                status
                    .conditions
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| PodConditionInfo {
                        type_: c.type_,
                        status: c.status,
                    })
                    .collect(),
            ),
            None => ("Unknown".into(), Vec::new()),
        };

        PodInfo {
            name,
            phase,
            node,
            containers,
            conditions,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: String,
    pub ports: Vec<String>,
}

impl From<Service> for ServiceInfo {
    fn from(service: Service) -> Self {
        let name = service.name_any();
        let spec = service.spec.unwrap_or_default();

        // The API server fills in TCP when the protocol is omitted.
        let ports = spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| format!("{}/{}", p.port, p.protocol.unwrap_or_else(|| "TCP".into())))
            .collect();

        ServiceInfo {
            name,
            type_: spec.type_.unwrap_or_else(|| "ClusterIP".into()),
            cluster_ip: spec.cluster_ip.unwrap_or_default(),
            ports,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub name: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
}

impl From<Deployment> for DeploymentInfo {
    fn from(deploy: Deployment) -> Self {
        let name = deploy.name_any();
        let replicas = deploy.spec.and_then(|s| s.replicas).unwrap_or(0);
        let (ready_replicas, available_replicas) = deploy
            .status
            .map(|s| {
                (
                    s.ready_replicas.unwrap_or(0),
                    s.available_replicas.unwrap_or(0),
                )
            })
            .unwrap_or((0, 0));

        DeploymentInfo {
            name,
            replicas,
            ready_replicas,
            available_replicas,
        }
    }
}

/// Replica counts shared by replicasets and statefulsets.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaInfo {
    pub name: String,
    pub replicas: i32,
    pub ready_replicas: i32,
}

impl From<ReplicaSet> for ReplicaInfo {
    fn from(rs: ReplicaSet) -> Self {
        ReplicaInfo {
            name: rs.name_any(),
            replicas: rs.spec.and_then(|s| s.replicas).unwrap_or(0),
            ready_replicas: rs.status.and_then(|s| s.ready_replicas).unwrap_or(0),
        }
    }
}

impl From<StatefulSet> for ReplicaInfo {
    fn from(sts: StatefulSet) -> Self {
        ReplicaInfo {
            name: sts.name_any(),
            replicas: sts.spec.and_then(|s| s.replicas).unwrap_or(0),
            ready_replicas: sts.status.and_then(|s| s.ready_replicas).unwrap_or(0),
        }
    }
}
