use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use fluxdash_k8s_backend::{DEFAULT_PATCHABLE_FIELDS, TriggerConvention};
use serde::Deserialize;

/// Config file looked up in the working directory (any extension `config` understands).
const DEFAULT_CONFIG_FILE: &str = "fluxdash";

/// Overrides the config file location.
const CONFIG_PATH_ENV: &str = "FLUXDASH_CONFIG";

/// Prefix for environment overrides, e.g. `FLUXDASH_CONTROL_NAMESPACE=flux-system`.
const ENV_PREFIX: &str = "FLUXDASH";

/// Conventional port variable honoured on top of the prefixed settings.
const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    /// Namespace the Flux Kustomization objects live in.
    pub control_namespace: String,
    /// API version of `kustomize.toolkit.fluxcd.io` served by the installed controller.
    pub kustomization_version: String,
    /// Kustomization whose target namespace `/cluster-status` shows when none is requested.
    pub default_kustomization: String,
    pub request_timeout_secs: u64,
    pub trigger: TriggerConvention,
    pub patchable_fields: Vec<String>,
}

impl DashboardConfig {
    /// Defaults, then the optional config file, then `FLUXDASH_*` variables, then `PORT`.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("patchable_fields");

        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .set_default("control_namespace", "flux-system")?
            .set_default("kustomization_version", "v1beta2")?
            .set_default("default_kustomization", "web-app")?
            .set_default("request_timeout_secs", 5_i64)?
            .set_default("trigger", "force")?
            .set_default("patchable_fields", DEFAULT_PATCHABLE_FIELDS.to_vec())?
            .add_source(File::with_name(&file).required(false))
            .add_source(environment)
            .set_override_option("port", env::var(PORT_ENV).ok())?
            .build()?
            .try_deserialize::<Self>()?
            .validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
