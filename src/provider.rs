// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider configuration and the registry of resources and data sources.
//!
//! # Configuration
//!
//! Each setting is taken from the first source that sets it:
//!
//! 1. the provider configuration block (or `--config` file)
//! 2. the environment (`KUBECONFIG`, `HIVE_PROVIDER_CONTEXT`,
//!    `HIVE_PROVIDER_FIELD_MANAGER`, `HIVE_PROVIDER_OFFLINE`)
//! 3. built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use hive_provider::provider::{Provider, ProviderConfig};
//! use serde_json::json;
//!
//! # async fn example() {
//! let mut provider = Provider::hive();
//! let diags = provider
//!     .configure(ProviderConfig {
//!         offline: Some(true),
//!         ..ProviderConfig::default()
//!     })
//!     .await;
//! assert!(!diags.has_error());
//!
//! let response = provider
//!     .read_data_source(
//!         "hive_cluster_image_set_v1_manifest",
//!         &json!({
//!             "metadata": {"name": "openshift-v4.14.0"},
//!             "spec": {"release_image": "quay.io/openshift-release-dev/ocp-release:4.14.0-x86_64"}
//!         }),
//!     )
//!     .await;
//! println!("{}", response.state.unwrap()["yaml"]);
//! # }
//! ```

use crate::client::{connect, ClientError, KubeObjectClient, ObjectClient};
use crate::constants::{ENV_CONTEXT, ENV_FIELD_MANAGER, ENV_KUBECONFIG, ENV_OFFLINE, MANIFEST_SUFFIX};
use crate::context::Context;
use crate::crd::{
    Checkpoint, ClusterClaim, ClusterDeployment, ClusterDeploymentCustomization, ClusterDeprovision,
    ClusterImageSet, ClusterPool, ClusterRelocate, DNSZone, HiveConfig, MachinePool, MachinePoolNameLease,
    SelectorSyncSet, SyncSet,
};
use crate::data_source::{CustomResourceDataSource, DataSourceHandler, ManifestDataSource};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::resource::{CustomResourceHandler, ResourceHandler, ResourceResponse};
use crate::schema::{provider_schema, ProviderSchema};
use crate::validation::validate;
use kube::{CustomResourceExt, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

const SUMMARY_CONFIGURE: &str = "Unable to configure provider";
const SUMMARY_UNCONFIGURED: &str = "Provider not configured";

/// Errors while loading the provider configuration.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("environment variable {var} must be 'true' or 'false', got '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("failed to read provider configuration {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse provider configuration {path}: {source}")]
    ParseConfig {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Provider configuration block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Path of the kubeconfig file
    pub kubeconfig: Option<String>,

    /// Kubeconfig context
    pub context: Option<String>,

    /// Default field manager for server-side apply
    pub field_manager: Option<String>,

    /// Do not contact any API server
    pub offline: Option<bool>,
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ProviderError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(ProviderError::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

impl ProviderConfig {
    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ProviderError::ReadConfig {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ProviderError::ParseConfig { path: display, source })
    }

    /// Configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `HIVE_PROVIDER_OFFLINE` is not a boolean.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Configuration from an environment lookup function.
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offline variable is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ProviderError> {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());
        Ok(Self {
            kubeconfig: get(ENV_KUBECONFIG),
            context: get(ENV_CONTEXT),
            field_manager: get(ENV_FIELD_MANAGER),
            offline: get(ENV_OFFLINE).map(|v| parse_bool(ENV_OFFLINE, &v)).transpose()?,
        })
    }

    /// Fill the settings `self` leaves unset from `fallback`.
    #[must_use]
    pub fn merge(self, fallback: Self) -> Self {
        Self {
            kubeconfig: self.kubeconfig.or(fallback.kubeconfig),
            context: self.context.or(fallback.context),
            field_manager: self.field_manager.or(fallback.field_manager),
            offline: self.offline.or(fallback.offline),
        }
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }

    /// Check the configuration against the provider schema.
    #[must_use]
    pub fn validate(&self) -> Diagnostics {
        match serde_json::to_value(self) {
            Ok(value) => validate(&value, &provider_schema().attributes, ""),
            Err(e) => Diagnostic::error(SUMMARY_CONFIGURE, e.to_string()).into(),
        }
    }
}

/// The Hive provider: a registry of resources and data sources plus the
/// context they run with once configured.
#[derive(Default)]
pub struct Provider {
    resources: BTreeMap<String, Arc<dyn ResourceHandler>>,
    data_sources: BTreeMap<String, Arc<dyn DataSourceHandler>>,
    context: Option<Context>,
}

impl Provider {
    /// An empty, unconfigured provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with every Hive kind registered.
    #[must_use]
    pub fn hive() -> Self {
        let mut provider = Self::new();
        macro_rules! register_kinds {
            ($($kind:ty),+ $(,)?) => {
                $(provider.register::<$kind>();)+
            };
        }
        register_kinds!(
            Checkpoint,
            ClusterClaim,
            ClusterDeployment,
            ClusterDeploymentCustomization,
            ClusterDeprovision,
            ClusterImageSet,
            ClusterPool,
            ClusterRelocate,
            DNSZone,
            HiveConfig,
            MachinePool,
            MachinePoolNameLease,
            SelectorSyncSet,
            SyncSet,
        );
        provider
    }

    /// Register the resource, data source and manifest data source of `K`.
    pub fn register<K>(&mut self)
    where
        K: CustomResourceExt + Resource<DynamicType = ()> + 'static,
    {
        let resource: Arc<dyn ResourceHandler> = Arc::new(CustomResourceHandler::<K>::new());
        let data_source: Arc<dyn DataSourceHandler> = Arc::new(CustomResourceDataSource::<K>::new());
        let manifest: Arc<dyn DataSourceHandler> = Arc::new(ManifestDataSource::<K>::new());

        debug!(type_name = %resource.type_name(), "Registering kind");
        self.resources.insert(resource.type_name(), resource);
        self.data_sources.insert(data_source.type_name(), data_source);
        self.data_sources.insert(manifest.type_name(), manifest);
    }

    /// Use an already built context instead of [`Provider::configure`].
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Use `client` with default settings.
    #[must_use]
    pub fn with_client(self, client: Arc<dyn ObjectClient>) -> Self {
        self.with_context(Context::new(client))
    }

    #[must_use]
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    #[must_use]
    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: Some(provider_schema()),
            resources: self
                .resources
                .iter()
                .map(|(name, handler)| (name.clone(), handler.schema()))
                .collect(),
            data_sources: self
                .data_sources
                .iter()
                .map(|(name, handler)| (name.clone(), handler.schema()))
                .collect(),
        }
    }

    /// Configure the provider, merging `config` with the environment.
    pub async fn configure(&mut self, config: ProviderConfig) -> Diagnostics {
        let env = match ProviderConfig::from_env() {
            Ok(env) => env,
            Err(e) => return Diagnostic::error(SUMMARY_CONFIGURE, e.to_string()).into(),
        };
        self.configure_resolved(config.merge(env)).await
    }

    /// Configure the provider from a configuration that is already merged.
    pub async fn configure_resolved(&mut self, config: ProviderConfig) -> Diagnostics {
        let diags = config.validate();
        if diags.has_error() {
            return diags;
        }

        let context = if config.is_offline() {
            info!("Provider configured offline");
            Context::offline()
        } else {
            match connect(&config).await {
                Ok(client) => {
                    info!(
                        kubeconfig = ?config.kubeconfig,
                        context = ?config.context,
                        "Provider configured"
                    );
                    Context::new(Arc::new(KubeObjectClient::new(client)))
                }
                Err(e) => {
                    return Diagnostic::error(SUMMARY_CONFIGURE, ProviderError::from(e).to_string()).into();
                }
            }
        };

        self.context = Some(match config.field_manager {
            Some(field_manager) => context.with_field_manager(field_manager),
            None => context,
        });
        diags
    }

    fn resource(&self, type_name: &str) -> Result<(&dyn ResourceHandler, &Context), ResourceResponse> {
        let handler = self.resources.get(type_name).ok_or_else(|| {
            ResourceResponse::failed(Diagnostic::error(
                "Unknown resource type",
                format!("The provider does not support resource type '{type_name}'."),
            ))
        })?;
        let context = self.context.as_ref().ok_or_else(unconfigured)?;
        Ok((handler.as_ref(), context))
    }

    pub async fn create(&self, type_name: &str, plan: &Value) -> ResourceResponse {
        match self.resource(type_name) {
            Ok((handler, ctx)) => handler.create(ctx, plan).await,
            Err(response) => response,
        }
    }

    pub async fn read(&self, type_name: &str, state: &Value) -> ResourceResponse {
        match self.resource(type_name) {
            Ok((handler, ctx)) => handler.read(ctx, state).await,
            Err(response) => response,
        }
    }

    pub async fn update(&self, type_name: &str, plan: &Value, prior: &Value) -> ResourceResponse {
        match self.resource(type_name) {
            Ok((handler, ctx)) => handler.update(ctx, plan, prior).await,
            Err(response) => response,
        }
    }

    pub async fn delete(&self, type_name: &str, state: &Value) -> ResourceResponse {
        match self.resource(type_name) {
            Ok((handler, ctx)) => handler.delete(ctx, state).await,
            Err(response) => response,
        }
    }

    pub async fn import(&self, type_name: &str, id: &str) -> ResourceResponse {
        match self.resource(type_name) {
            Ok((handler, ctx)) => handler.import(ctx, id).await,
            Err(response) => response,
        }
    }

    /// Read a data source. Manifest data sources work on an unconfigured provider.
    pub async fn read_data_source(&self, type_name: &str, config: &Value) -> ResourceResponse {
        let Some(handler) = self.data_sources.get(type_name) else {
            return ResourceResponse::failed(Diagnostic::error(
                "Unknown data source type",
                format!("The provider does not support data source type '{type_name}'."),
            ));
        };
        match &self.context {
            Some(ctx) => handler.read(ctx, config).await,
            None if type_name.ends_with(MANIFEST_SUFFIX) => handler.read(&Context::offline(), config).await,
            None => unconfigured(),
        }
    }
}

fn unconfigured() -> ResourceResponse {
    ResourceResponse::failed(Diagnostic::error(
        SUMMARY_UNCONFIGURED,
        "The provider must be configured before resources are managed.",
    ))
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("resources", &self.resources.len())
            .field("data_sources", &self.data_sources.len())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
