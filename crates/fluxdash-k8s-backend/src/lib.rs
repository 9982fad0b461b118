pub mod client;
pub mod error;
pub mod kustomizations;
pub mod reconcile;
pub mod status;
pub mod workloads;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{ClusterClient, CustomResourceRef, KubeClusterClient};
pub use error::{ClusterError, ReconcileError};
pub use kustomizations::{Kustomization, KustomizationRegistry, PlatformInfo};
pub use reconcile::{DEFAULT_PATCHABLE_FIELDS, Reconciler, TriggerConvention};
pub use status::ClusterStatus;
pub use workloads::{DeploymentInfo, PodConditionInfo, PodInfo, ReplicaInfo, ServiceInfo};
