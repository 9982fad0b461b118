use serde::{Deserialize, Serialize};

use crate::client::ClusterClient;
use crate::error::ClusterError;
use crate::workloads::{DeploymentInfo, PodInfo, ReplicaInfo, ServiceInfo};

/// Point-in-time view of the workloads in one namespace.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub target_namespace: String,
    pub pods: Vec<PodInfo>,
    pub services: Vec<ServiceInfo>,
    pub deployments: Vec<DeploymentInfo>,
    pub replicasets: Vec<ReplicaInfo>,
    pub statefulsets: Vec<ReplicaInfo>,
}

impl ClusterStatus {
    /// Lists all five workload kinds in `namespace` concurrently.
    ///
    /// The first failing call fails the whole snapshot; the other calls are
    /// dropped and nothing partial is returned.
    pub async fn collect(
        client: &dyn ClusterClient,
        namespace: &str,
    ) -> Result<Self, ClusterError> {
        if namespace.is_empty() {
            return Err(ClusterError::EmptyArgument("namespace"));
        }

        let (pods, services, deployments, replicasets, statefulsets) = tokio::try_join!(
            client.list_pods(namespace),
            client.list_services(namespace),
            client.list_deployments(namespace),
            client.list_replica_sets(namespace),
            client.list_stateful_sets(namespace),
        )?;

        tracing::debug!(
            "collected {} pods, {} services, {} deployments in {}",
            pods.len(),
            services.len(),
            deployments.len(),
            namespace
        );

        Ok(ClusterStatus {
            target_namespace: namespace.to_string(),
            pods: pods.into_iter().map(PodInfo::from).collect(),
            services: services.into_iter().map(ServiceInfo::from).collect(),
            deployments: deployments.into_iter().map(DeploymentInfo::from).collect(),
            replicasets: replicasets.into_iter().map(ReplicaInfo::from).collect(),
            statefulsets: statefulsets.into_iter().map(ReplicaInfo::from).collect(),
        })
    }
}
