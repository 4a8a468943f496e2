// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dynamic Kubernetes client used by resources and data sources.
//!
//! Every Hive kind goes through the same three calls (GET, server-side apply,
//! DELETE) over [`DynamicObject`], so the client is a small trait. The production
//! implementation is [`KubeObjectClient`]; tests use
//! [`crate::memory::InMemoryObjectClient`].

use crate::provider::ProviderConfig;
use async_trait::async_trait;
use kube::api::{Api, DeleteParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, DynamicObject};
use kube::{Client, Config};
use thiserror::Error;
use tracing::debug;

/// Errors returned by an [`ObjectClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The object does not exist.
    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    /// Server-side apply conflict with another field manager.
    #[error("apply conflict: {0}")]
    Conflict(String),

    /// Any other error status returned by the API server.
    #[error("API error {code} ({reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },

    /// The API server could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client could not be configured from the kubeconfig.
    #[error("client configuration error: {0}")]
    Config(String),

    /// The provider is configured offline.
    #[error("the provider is configured with offline = true and cannot contact the API server")]
    Offline,
}

impl ClientError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. }) || self.code() == Some(404)
    }

    /// Transient errors: rate limiting, server errors and transport failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { code, .. } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }

    /// HTTP status code of the error, if it came from the API server.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<kube::Error> for ClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) => {
                if ae.code == 409 {
                    Self::Conflict(ae.message.clone())
                } else {
                    Self::Api {
                        code: ae.code,
                        reason: ae.reason.clone(),
                        message: ae.message.clone(),
                    }
                }
            }
            kube::Error::SerdeError(e) => Self::Serialization(e),
            kube::Error::Service(e) => Self::Transport(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Parameters of a server-side apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyParams {
    pub field_manager: String,
    /// Take ownership of fields managed by other field managers.
    pub force: bool,
}

/// Minimal dynamic client over Kubernetes objects.
///
/// `namespace` is `None` for cluster-scoped kinds.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn get(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ClientError>;

    /// Server-side apply `object`, returning the object as stored by the server.
    async fn apply(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        object: &DynamicObject,
        params: &ApplyParams,
    ) -> Result<DynamicObject, ClientError>;

    async fn delete(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ClientError>;
}

/// Display name of an object for errors and logs: `namespace/name` or `name`.
#[must_use]
pub fn display_name(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}/{name}"),
        None => name.to_string(),
    }
}

/// [`ObjectClient`] backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeObjectClient {
    client: Client,
}

impl KubeObjectClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, resource: &ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, resource),
            None => Api::all_with(self.client.clone(), resource),
        }
    }
}

fn not_found_or(err: kube::Error, resource: &ApiResource, namespace: Option<&str>, name: &str) -> ClientError {
    match ClientError::from(err) {
        ClientError::Api { code: 404, .. } => ClientError::NotFound {
            kind: resource.kind.clone(),
            name: display_name(namespace, name),
        },
        other => other,
    }
}

#[async_trait]
impl ObjectClient for KubeObjectClient {
    async fn get(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ClientError> {
        debug!(kind = %resource.kind, namespace = ?namespace, name = %name, "GET object");
        self.api(resource, namespace)
            .get(name)
            .await
            .map_err(|e| not_found_or(e, resource, namespace, name))
    }

    async fn apply(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        object: &DynamicObject,
        params: &ApplyParams,
    ) -> Result<DynamicObject, ClientError> {
        let name = object.metadata.name.as_deref().unwrap_or_default();
        debug!(
            kind = %resource.kind,
            namespace = ?namespace,
            name = %name,
            field_manager = %params.field_manager,
            force = params.force,
            "Server-side apply"
        );

        let mut patch_params = PatchParams::apply(&params.field_manager);
        if params.force {
            patch_params = patch_params.force();
        }

        self.api(resource, namespace)
            .patch(name, &patch_params, &Patch::Apply(object))
            .await
            .map_err(ClientError::from)
    }

    async fn delete(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ClientError> {
        debug!(kind = %resource.kind, namespace = ?namespace, name = %name, "DELETE object");
        self.api(resource, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| not_found_or(e, resource, namespace, name))
    }
}

/// [`ObjectClient`] of an offline provider: every call fails with [`ClientError::Offline`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineClient;

#[async_trait]
impl ObjectClient for OfflineClient {
    async fn get(&self, _: &ApiResource, _: Option<&str>, _: &str) -> Result<DynamicObject, ClientError> {
        Err(ClientError::Offline)
    }

    async fn apply(
        &self,
        _: &ApiResource,
        _: Option<&str>,
        _: &DynamicObject,
        _: &ApplyParams,
    ) -> Result<DynamicObject, ClientError> {
        Err(ClientError::Offline)
    }

    async fn delete(&self, _: &ApiResource, _: Option<&str>, _: &str) -> Result<(), ClientError> {
        Err(ClientError::Offline)
    }
}

/// Build a Kubernetes client from the provider configuration.
///
/// An explicit `kubeconfig` path is read as-is; otherwise a `context` selects an
/// entry of the default kubeconfig. With neither, the configuration is inferred
/// (in-cluster service account, then `$KUBECONFIG` / `~/.kube/config`).
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the kubeconfig cannot be read or the
/// requested context does not exist.
pub async fn connect(config: &ProviderConfig) -> Result<Client, ClientError> {
    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..KubeConfigOptions::default()
    };

    let kube_config = match (&config.kubeconfig, &config.context) {
        (Some(path), _) => {
            debug!(path = %path, context = ?config.context, "Loading kubeconfig");
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| ClientError::Config(format!("failed to read kubeconfig {path}: {e}")))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| ClientError::Config(e.to_string()))?
        }
        (None, Some(context)) => {
            debug!(context = %context, "Loading default kubeconfig");
            Config::from_kubeconfig(&options)
                .await
                .map_err(|e| ClientError::Config(e.to_string()))?
        }
        (None, None) => Config::infer()
            .await
            .map_err(|e| ClientError::Config(e.to_string()))?,
    };

    Client::try_from(kube_config).map_err(|e| ClientError::Config(e.to_string()))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
