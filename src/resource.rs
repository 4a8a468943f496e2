// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic resource managing one Hive CRD kind.
//!
//! Every kind goes through the same lifecycle, so a single handler type serves
//! them all; only the [`KindInfo`] differs.
//!
//! ## Lifecycle
//!
//! - **create**: validate the plan, build the object (apiVersion, kind, metadata,
//!   translated spec), server-side apply it, wait for `wait_for_upsert`, and
//!   write the server's version of the object into state
//! - **read**: GET the object; a missing object removes the resource from state
//! - **update**: refuse changes of `metadata.name`/`metadata.namespace`, then
//!   apply like create
//! - **delete**: DELETE the object (a missing object is fine) and optionally wait
//!   until it is gone
//! - **import**: parse `namespace/name` (or `name`) and read the object

use crate::client::{ApplyParams, ClientError};
use crate::context::Context;
use crate::convert::{from_kubernetes, to_kubernetes};
use crate::diagnostics::{
    client_error_diagnostic, Diagnostic, Diagnostics, SUMMARY_DELETE, SUMMARY_GET, SUMMARY_MARSHAL,
    SUMMARY_PATCH, SUMMARY_UNMARSHAL, SUMMARY_WAIT,
};
use crate::kind::KindInfo;
use crate::model::{MetadataModel, ResourceModel};
use crate::naming::{object_id, parse_import_id};
use crate::retry::retry_with_backoff;
use crate::schema::{Attribute, Schema};
use crate::validation::validate;
use crate::wait::{validate_rules, wait_for_delete, wait_for_upsert, WaitTarget};
use async_trait::async_trait;
use kube::core::{DynamicObject, ObjectMeta};
use kube::{CustomResourceExt, Resource};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a resource or data source operation.
///
/// `state` is `None` when the resource no longer exists (read of a deleted
/// object, successful delete) or when the operation failed before anything was
/// created.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResourceResponse {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    #[must_use]
    pub fn ok(state: Value) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn removed() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state: None,
            diagnostics: diagnostics.into(),
        }
    }

    /// Keep `state` and report `diagnostics` with it.
    #[must_use]
    pub fn with_state(state: Option<Value>, diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state,
            diagnostics: diagnostics.into(),
        }
    }
}

/// A managed resource type.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Type name, e.g. `hive_cluster_deployment_v1`.
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    async fn create(&self, ctx: &Context, plan: &Value) -> ResourceResponse;

    async fn read(&self, ctx: &Context, state: &Value) -> ResourceResponse;

    async fn update(&self, ctx: &Context, plan: &Value, prior: &Value) -> ResourceResponse;

    async fn delete(&self, ctx: &Context, state: &Value) -> ResourceResponse;

    async fn import(&self, ctx: &Context, id: &str) -> ResourceResponse;
}

/// Which server-side labels and annotations are written into state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MetadataKeys {
    /// Only the keys present in the configuration.
    Configured,
    /// Every key on the object.
    All,
}

fn tracked_entries(
    server: Option<&BTreeMap<String, String>>,
    configured: Option<&BTreeMap<String, String>>,
    keys: MetadataKeys,
) -> Value {
    let server = server.filter(|m| !m.is_empty());
    match (keys, configured) {
        (MetadataKeys::All, _) => server.map_or(Value::Null, |server| json!(server)),
        (MetadataKeys::Configured, None) => Value::Null,
        // A configured map stays a map, even when the server holds none of its keys
        (MetadataKeys::Configured, Some(configured)) => Value::Object(
            server
                .into_iter()
                .flatten()
                .filter(|(k, _)| configured.contains_key(*k))
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
    }
}

/// State of the `metadata` attribute from a server object.
pub(crate) fn metadata_state(
    info: &KindInfo,
    object: &DynamicObject,
    configured: &MetadataModel,
    keys: MetadataKeys,
) -> Value {
    let meta = &object.metadata;
    let mut state = Map::new();
    state.insert(
        "name".to_string(),
        json!(meta.name.clone().unwrap_or_else(|| configured.name.clone())),
    );
    if info.namespaced {
        state.insert(
            "namespace".to_string(),
            json!(meta.namespace.clone().or_else(|| configured.namespace.clone())),
        );
    }
    state.insert(
        "labels".to_string(),
        tracked_entries(meta.labels.as_ref(), configured.labels.as_ref(), keys),
    );
    state.insert(
        "annotations".to_string(),
        tracked_entries(meta.annotations.as_ref(), configured.annotations.as_ref(), keys),
    );
    state.insert("uid".to_string(), json!(meta.uid));
    state.insert("resource_version".to_string(), json!(meta.resource_version));
    state.insert("generation".to_string(), json!(meta.generation));
    Value::Object(state)
}

/// State of the `spec` attribute from a server object.
pub(crate) fn spec_state(info: &KindInfo, object: &DynamicObject) -> Option<Value> {
    let attributes = info.spec_attributes()?;
    Some(from_kubernetes(
        object.data.get("spec").unwrap_or(&Value::Null),
        attributes,
    ))
}

/// Build the object to apply from a resource model.
pub(crate) fn build_object(info: &KindInfo, metadata: &MetadataModel, spec: &Value) -> DynamicObject {
    let mut object = DynamicObject::new(&metadata.name, &info.api_resource);
    object.metadata = ObjectMeta {
        name: Some(metadata.name.clone()),
        namespace: if info.namespaced {
            metadata.namespace.clone()
        } else {
            None
        },
        labels: metadata.labels.clone(),
        annotations: metadata.annotations.clone(),
        ..ObjectMeta::default()
    };

    object.data = match info.spec_attributes() {
        Some(attributes) => {
            let translated = to_kubernetes(spec, attributes);
            let spec = if translated.is_null() { json!({}) } else { translated };
            json!({ "spec": spec })
        }
        None => json!({}),
    };
    object
}

/// Namespace argument for client calls.
pub(crate) fn request_namespace<'a>(info: &KindInfo, metadata: &'a MetadataModel) -> Option<&'a str> {
    if info.namespaced {
        metadata.namespace.as_deref()
    } else {
        None
    }
}

/// Paths of `requires_replace` attributes whose value differs between two values.
fn replaced_attributes(
    attributes: &BTreeMap<String, Attribute>,
    plan: &Value,
    prior: &Value,
    path: &str,
    out: &mut Vec<String>,
) {
    for (name, attr) in attributes {
        let attr_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{path}.{name}")
        };
        let planned = plan.get(name).unwrap_or(&Value::Null);
        let previous = prior.get(name).unwrap_or(&Value::Null);

        if attr.requires_replace && !previous.is_null() && planned != previous {
            out.push(attr_path);
        } else if let Some(nested) = attr.attributes() {
            if planned.is_object() && previous.is_object() {
                replaced_attributes(nested, planned, previous, &attr_path, out);
            }
        }
    }
}

fn parse_model(value: &Value) -> Result<ResourceModel, Diagnostic> {
    serde_json::from_value(value.clone()).map_err(|e| {
        Diagnostic::error(
            SUMMARY_MARSHAL,
            format!("The configuration could not be read: {e}"),
        )
    })
}

/// Generic handler for the custom resource `K`.
pub struct CustomResourceHandler<K> {
    info: KindInfo,
    _kind: PhantomData<fn() -> K>,
}

impl<K> CustomResourceHandler<K>
where
    K: CustomResourceExt + Resource<DynamicType = ()>,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: KindInfo::of::<K>(),
            _kind: PhantomData,
        }
    }
}

impl<K> Default for CustomResourceHandler<K>
where
    K: CustomResourceExt + Resource<DynamicType = ()>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> CustomResourceHandler<K> {
    #[must_use]
    pub fn info(&self) -> &KindInfo {
        &self.info
    }

    /// Full resource state from a server object and the model it was applied from.
    fn state_from_object(
        &self,
        ctx: &Context,
        object: &DynamicObject,
        model: &ResourceModel,
        keys: MetadataKeys,
    ) -> Value {
        let name = object.metadata.name.as_deref().unwrap_or(&model.metadata.name);
        let namespace = if self.info.namespaced {
            object
                .metadata
                .namespace
                .as_deref()
                .or(model.metadata.namespace.as_deref())
        } else {
            None
        };

        let mut state = Map::new();
        state.insert("id".to_string(), json!(object_id(namespace, name)));
        state.insert(
            "api_version".to_string(),
            json!(self.info.api_resource.api_version),
        );
        state.insert("kind".to_string(), json!(self.info.api_resource.kind));
        state.insert(
            "field_manager".to_string(),
            json!(model
                .field_manager
                .clone()
                .unwrap_or_else(|| ctx.field_manager.clone())),
        );
        state.insert(
            "force_conflicts".to_string(),
            json!(model.force_conflicts.unwrap_or(false)),
        );
        state.insert("wait_for_upsert".to_string(), json!(model.wait_for_upsert));
        state.insert("wait_for_delete".to_string(), json!(model.wait_for_delete));
        state.insert("timeouts".to_string(), json!(model.timeouts));
        state.insert(
            "metadata".to_string(),
            metadata_state(&self.info, object, &model.metadata, keys),
        );
        if let Some(spec) = spec_state(&self.info, object) {
            state.insert("spec".to_string(), spec);
        }
        Value::Object(state)
    }

    /// Apply a plan and wait for its rules. Shared by create and update.
    async fn upsert(&self, ctx: &Context, plan: &Value, timeout: Duration, operation: &str) -> ResourceResponse {
        let schema = self.schema_inner();
        let diags = validate(plan, &schema.attributes, "");
        if diags.has_error() {
            return ResourceResponse::failed(diags);
        }

        let model = match parse_model(plan) {
            Ok(model) => model,
            Err(diag) => return ResourceResponse::failed(diag),
        };
        if let Err(e) = validate_rules(model.wait_rules()) {
            return ResourceResponse::failed(
                Diagnostic::error("Invalid wait condition", e.to_string()).with_attribute("wait_for_upsert"),
            );
        }

        let namespace = request_namespace(&self.info, &model.metadata);
        let name = model.metadata.name.as_str();
        let object = build_object(&self.info, &model.metadata, &model.spec);
        let params = ApplyParams {
            field_manager: model
                .field_manager
                .clone()
                .unwrap_or_else(|| ctx.field_manager.clone()),
            force: model.force_conflicts.unwrap_or(false),
        };

        info!(
            kind = %self.info.kind(),
            namespace = ?namespace,
            name = %name,
            operation = operation,
            field_manager = %params.field_manager,
            "Applying resource"
        );

        let operation_name = format!("{operation} {} {}", self.info.kind(), object_id(namespace, name));
        let applied = retry_with_backoff(
            ctx.backoff.clone(),
            || ctx.client.apply(&self.info.api_resource, namespace, &object, &params),
            &operation_name,
        )
        .await;

        let mut latest = match applied {
            Ok(object) => object,
            Err(e) => {
                warn!(kind = %self.info.kind(), name = %name, error = %e, "Apply failed");
                return ResourceResponse::failed(client_error_diagnostic(SUMMARY_PATCH, &e));
            }
        };

        let mut diagnostics = Diagnostics::new();
        if !model.wait_rules().is_empty() {
            let target = WaitTarget {
                resource: &self.info.api_resource,
                namespace,
                name,
                timeout,
                poll_interval: ctx.poll_interval,
            };
            match wait_for_upsert(ctx.client.as_ref(), target, model.wait_rules()).await {
                Ok(object) => latest = object,
                Err(e) => {
                    warn!(kind = %self.info.kind(), name = %name, error = %e, "Wait for upsert failed");
                    diagnostics.push(Diagnostic::error(SUMMARY_WAIT, e.to_string()).with_attribute("wait_for_upsert"));
                }
            }
        }

        let state = self.state_from_object(ctx, &latest, &model, MetadataKeys::Configured);
        ResourceResponse::with_state(Some(state), diagnostics)
    }

    fn schema_inner(&self) -> Schema {
        self.info.resource_schema()
    }

    /// Identify the object of a state: metadata first, then `id`.
    fn locate(&self, model: &ResourceModel) -> Result<(Option<String>, String), Diagnostic> {
        if !model.metadata.name.is_empty() {
            let namespace = request_namespace(&self.info, &model.metadata).map(str::to_string);
            return Ok((namespace, model.metadata.name.clone()));
        }
        let id = model.id.as_deref().unwrap_or_default();
        parse_import_id(id, self.info.namespaced)
            .map_err(|e| Diagnostic::error(SUMMARY_UNMARSHAL, e.to_string()))
    }

    async fn get(&self, ctx: &Context, namespace: Option<&str>, name: &str) -> Result<DynamicObject, ClientError> {
        let operation_name = format!("get {} {}", self.info.kind(), object_id(namespace, name));
        retry_with_backoff(
            ctx.backoff.clone(),
            || ctx.client.get(&self.info.api_resource, namespace, name),
            &operation_name,
        )
        .await
    }
}

#[async_trait]
impl<K> ResourceHandler for CustomResourceHandler<K>
where
    K: 'static,
{
    fn type_name(&self) -> String {
        self.info.type_name()
    }

    fn schema(&self) -> Schema {
        self.schema_inner()
    }

    async fn create(&self, ctx: &Context, plan: &Value) -> ResourceResponse {
        let timeout = parse_model(plan)
            .map(|m| m.timeouts().create())
            .unwrap_or_default();
        self.upsert(ctx, plan, timeout, "create").await
    }

    async fn read(&self, ctx: &Context, state: &Value) -> ResourceResponse {
        let model = match parse_model(state) {
            Ok(model) => model,
            Err(diag) => return ResourceResponse::failed(diag),
        };
        let (namespace, name) = match self.locate(&model) {
            Ok(located) => located,
            Err(diag) => return ResourceResponse::failed(diag),
        };

        match self.get(ctx, namespace.as_deref(), &name).await {
            Ok(object) => ResourceResponse::ok(self.state_from_object(ctx, &object, &model, MetadataKeys::Configured)),
            Err(e) if e.is_not_found() => {
                info!(
                    kind = %self.info.kind(),
                    id = %object_id(namespace.as_deref(), &name),
                    "Object no longer exists, removing from state"
                );
                ResourceResponse::removed()
            }
            Err(e) => ResourceResponse::with_state(Some(state.clone()), client_error_diagnostic(SUMMARY_GET, &e)),
        }
    }

    async fn update(&self, ctx: &Context, plan: &Value, prior: &Value) -> ResourceResponse {
        let schema = self.schema_inner();
        let mut replaced = Vec::new();
        replaced_attributes(&schema.attributes, plan, prior, "", &mut replaced);
        if !replaced.is_empty() {
            let mut diags = Diagnostics::new();
            for path in replaced {
                diags.attribute_error(
                    &path,
                    "Attribute requires replacement",
                    format!("Changing '{path}' requires destroying and re-creating the object."),
                );
            }
            return ResourceResponse::with_state(Some(prior.clone()), diags);
        }

        let timeout = parse_model(plan)
            .map(|m| m.timeouts().update())
            .unwrap_or_default();
        let response = self.upsert(ctx, plan, timeout, "update").await;
        if response.state.is_none() {
            // Nothing was applied; the object is unchanged
            return ResourceResponse::with_state(Some(prior.clone()), response.diagnostics);
        }
        response
    }

    async fn delete(&self, ctx: &Context, state: &Value) -> ResourceResponse {
        let model = match parse_model(state) {
            Ok(model) => model,
            Err(diag) => return ResourceResponse::with_state(Some(state.clone()), diag),
        };
        let (namespace, name) = match self.locate(&model) {
            Ok(located) => located,
            Err(diag) => return ResourceResponse::with_state(Some(state.clone()), diag),
        };
        let namespace = namespace.as_deref();

        info!(kind = %self.info.kind(), namespace = ?namespace, name = %name, operation = "delete", "Deleting resource");

        let operation_name = format!("delete {} {}", self.info.kind(), object_id(namespace, &name));
        let deleted = retry_with_backoff(
            ctx.backoff.clone(),
            || ctx.client.delete(&self.info.api_resource, namespace, &name),
            &operation_name,
        )
        .await;

        match deleted {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(kind = %self.info.kind(), name = %name, "Object already gone");
                return ResourceResponse::removed();
            }
            Err(e) => {
                return ResourceResponse::with_state(Some(state.clone()), client_error_diagnostic(SUMMARY_DELETE, &e));
            }
        }

        if model.wait_for_delete.unwrap_or(false) {
            let target = WaitTarget {
                resource: &self.info.api_resource,
                namespace,
                name: &name,
                timeout: model.timeouts().delete(),
                poll_interval: ctx.poll_interval,
            };
            if let Err(e) = wait_for_delete(ctx.client.as_ref(), target).await {
                return ResourceResponse::with_state(
                    Some(state.clone()),
                    Diagnostic::error(SUMMARY_WAIT, e.to_string()).with_attribute("wait_for_delete"),
                );
            }
        }

        ResourceResponse::removed()
    }

    async fn import(&self, ctx: &Context, id: &str) -> ResourceResponse {
        let (namespace, name) = match parse_import_id(id, self.info.namespaced) {
            Ok(parsed) => parsed,
            Err(e) => return ResourceResponse::failed(Diagnostic::error("Invalid import ID", e.to_string())),
        };

        info!(kind = %self.info.kind(), id = %id, operation = "import", "Importing resource");

        match self.get(ctx, namespace.as_deref(), &name).await {
            Ok(object) => {
                let model = ResourceModel {
                    metadata: MetadataModel {
                        name,
                        namespace,
                        ..MetadataModel::default()
                    },
                    ..ResourceModel::default()
                };
                ResourceResponse::ok(self.state_from_object(ctx, &object, &model, MetadataKeys::All))
            }
            Err(e) if e.is_not_found() => ResourceResponse::failed(Diagnostic::error(
                "Cannot import non-existent remote object",
                format!("{} {id} does not exist.", self.info.kind()),
            )),
            Err(e) => ResourceResponse::failed(client_error_diagnostic(SUMMARY_GET, &e)),
        }
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod resource_tests;
