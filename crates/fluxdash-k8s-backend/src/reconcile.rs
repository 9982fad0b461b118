use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::client::{ClusterClient, CustomResourceRef};
use crate::error::{ClusterError, ReconcileError};
use crate::kustomizations::kustomization_resource;

/// Spec fields an operator may edit when no explicit list is configured.
pub const DEFAULT_PATCHABLE_FIELDS: &[&str] = &[
    "suspend",
    "force",
    "interval",
    "retryInterval",
    "timeout",
    "path",
    "prune",
    "wait",
    "targetNamespace",
];

/// How a reconciliation request is encoded in `spec.force`.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerConvention {
    /// `force: true`
    #[default]
    Force,
    /// `force: "<RFC 3339 UTC timestamp>"`, unique per request
    Timestamp,
}

impl fmt::Display for TriggerConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerConvention::Force => write!(f, "force"),
            TriggerConvention::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl TriggerConvention {
    fn force_value(&self) -> Value {
        match self {
            TriggerConvention::Force => Value::Bool(true),
            TriggerConvention::Timestamp => {
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
            }
        }
    }
}

/// Merge patch that unsuspends a Kustomization and asks Flux to reconcile it.
pub fn reconcile_patch(convention: TriggerConvention) -> Value {
    json!({
        "spec": {
            "suspend": false,
            "force": convention.force_value(),
        }
    })
}

/// Issues merge patches against Kustomizations in the control namespace.
#[derive(Clone)]
pub struct Reconciler {
    client: Arc<dyn ClusterClient>,
    resource: CustomResourceRef,
    control_namespace: String,
    convention: TriggerConvention,
    patchable_fields: BTreeSet<String>,
}

impl Reconciler {
    pub fn new(
        client: Arc<dyn ClusterClient>,
        control_namespace: &str,
        version: &str,
        convention: TriggerConvention,
    ) -> Self {
        Self {
            client,
            resource: kustomization_resource(version),
            control_namespace: control_namespace.to_string(),
            convention,
            patchable_fields: DEFAULT_PATCHABLE_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }

    pub fn with_patchable_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patchable_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Request an immediate reconciliation of `name`.
    ///
    /// Only confirms the API server accepted the patch, not that Flux finished.
    pub async fn trigger(&self, name: &str) -> Result<(), ClusterError> {
        if name.is_empty() {
            return Err(ClusterError::EmptyArgument("name"));
        }

        let patch = reconcile_patch(self.convention);
        tracing::info!(
            "triggering reconciliation of {}/{} ({})",
            self.control_namespace,
            name,
            self.convention
        );

        self.client
            .merge_patch_custom_object(&self.resource, &self.control_namespace, name, &patch)
            .await
    }

    /// Merge `patch` onto the `spec` of `name`.
    pub async fn edit(&self, name: &str, patch: &Map<String, Value>) -> Result<(), ReconcileError> {
        if name.is_empty() {
            return Err(ClusterError::EmptyArgument("name").into());
        }
        if patch.is_empty() {
            return Err(ReconcileError::EmptyPatch);
        }
        if let Some(field) = patch
            .keys()
            .find(|field| !self.patchable_fields.contains(field.as_str()))
        {
            return Err(ReconcileError::FieldNotPatchable(field.clone()));
        }

        let body = json!({ "spec": patch });
        tracing::info!(
            "patching {}/{} spec fields {:?}",
            self.control_namespace,
            name,
            patch.keys().collect::<Vec<_>>()
        );

        self.client
            .merge_patch_custom_object(&self.resource, &self.control_namespace, name, &body)
            .await?;

        Ok(())
    }
}
