// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Data sources for Hive CRD kinds.
//!
//! Two data sources exist per kind:
//! - `hive_<kind>_v1` reads an existing object from the cluster
//! - `hive_<kind>_v1_manifest` renders an object as a YAML manifest without
//!   calling the API server, so it works with an offline provider

use crate::context::Context;
use crate::convert::{prune_nulls, to_kubernetes};
use crate::diagnostics::{client_error_diagnostic, Diagnostic, SUMMARY_GET, SUMMARY_MARSHAL};
use crate::kind::KindInfo;
use crate::model::MetadataModel;
use crate::naming::object_id;
use crate::resource::{metadata_state, request_namespace, spec_state, MetadataKeys, ResourceResponse};
use crate::retry::retry_with_backoff;
use crate::schema::Schema;
use crate::validation::validate;
use async_trait::async_trait;
use kube::{CustomResourceExt, Resource};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::marker::PhantomData;
use tracing::{debug, info};

/// A data source type.
#[async_trait]
pub trait DataSourceHandler: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &Context, config: &Value) -> ResourceResponse;
}

#[derive(Debug, Default, Deserialize)]
struct DataSourceModel {
    #[serde(default)]
    metadata: MetadataModel,
    #[serde(default)]
    spec: Value,
}

fn parse_config(info: &KindInfo, schema: &Schema, config: &Value) -> Result<DataSourceModel, ResourceResponse> {
    let diags = validate(config, &schema.attributes, "");
    if diags.has_error() {
        return Err(ResourceResponse::failed(diags));
    }
    serde_json::from_value(config.clone()).map_err(|e| {
        ResourceResponse::failed(Diagnostic::error(
            SUMMARY_MARSHAL,
            format!("The configuration of {} could not be read: {e}", info.kind()),
        ))
    })
}

/// Reads one object of kind `K` by name.
pub struct CustomResourceDataSource<K> {
    info: KindInfo,
    _kind: PhantomData<fn() -> K>,
}

impl<K> CustomResourceDataSource<K>
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

impl<K> Default for CustomResourceDataSource<K>
where
    K: CustomResourceExt + Resource<DynamicType = ()>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K> DataSourceHandler for CustomResourceDataSource<K>
where
    K: 'static,
{
    fn type_name(&self) -> String {
        self.info.type_name()
    }

    fn schema(&self) -> Schema {
        self.info.data_source_schema()
    }

    async fn read(&self, ctx: &Context, config: &Value) -> ResourceResponse {
        let model = match parse_config(&self.info, &self.schema(), config) {
            Ok(model) => model,
            Err(response) => return response,
        };
        let namespace = request_namespace(&self.info, &model.metadata);
        let name = model.metadata.name.as_str();
        let id = object_id(namespace, name);

        info!(kind = %self.info.kind(), id = %id, operation = "read", "Reading data source");

        let operation_name = format!("get {} {id}", self.info.kind());
        let fetched = retry_with_backoff(
            ctx.backoff.clone(),
            || ctx.client.get(&self.info.api_resource, namespace, name),
            &operation_name,
        )
        .await;

        let object = match fetched {
            Ok(object) => object,
            Err(e) if e.is_not_found() => {
                return ResourceResponse::failed(Diagnostic::error(
                    SUMMARY_GET,
                    format!("{} {id} does not exist.", self.info.kind()),
                ))
            }
            Err(e) => return ResourceResponse::failed(client_error_diagnostic(SUMMARY_GET, &e)),
        };

        let mut state = Map::new();
        state.insert("id".to_string(), json!(id));
        state.insert(
            "api_version".to_string(),
            json!(self.info.api_resource.api_version),
        );
        state.insert("kind".to_string(), json!(self.info.api_resource.kind));
        state.insert(
            "metadata".to_string(),
            metadata_state(&self.info, &object, &model.metadata, MetadataKeys::All),
        );
        if let Some(spec) = spec_state(&self.info, &object) {
            state.insert("spec".to_string(), spec);
        }
        ResourceResponse::ok(Value::Object(state))
    }
}

/// Renders an object of kind `K` as YAML.
pub struct ManifestDataSource<K> {
    info: KindInfo,
    _kind: PhantomData<fn() -> K>,
}

impl<K> ManifestDataSource<K>
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

impl<K> Default for ManifestDataSource<K>
where
    K: CustomResourceExt + Resource<DynamicType = ()>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ManifestDataSource<K> {
    /// The Kubernetes object of a manifest configuration, without null fields.
    fn manifest(&self, model: &DataSourceModel) -> Value {
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), json!(model.metadata.name));
        if self.info.namespaced {
            metadata.insert("namespace".to_string(), json!(model.metadata.namespace));
        }
        metadata.insert("labels".to_string(), json!(model.metadata.labels));
        metadata.insert("annotations".to_string(), json!(model.metadata.annotations));

        let mut object = Map::new();
        object.insert(
            "apiVersion".to_string(),
            json!(self.info.api_resource.api_version),
        );
        object.insert("kind".to_string(), json!(self.info.api_resource.kind));
        object.insert("metadata".to_string(), Value::Object(metadata));
        if let Some(attributes) = self.info.spec_attributes() {
            object.insert("spec".to_string(), to_kubernetes(&model.spec, attributes));
        }
        prune_nulls(&Value::Object(object))
    }
}

#[async_trait]
impl<K> DataSourceHandler for ManifestDataSource<K>
where
    K: 'static,
{
    fn type_name(&self) -> String {
        self.info.manifest_type_name()
    }

    fn schema(&self) -> Schema {
        self.info.manifest_schema()
    }

    async fn read(&self, _ctx: &Context, config: &Value) -> ResourceResponse {
        let model = match parse_config(&self.info, &self.schema(), config) {
            Ok(model) => model,
            Err(response) => return response,
        };
        let id = object_id(request_namespace(&self.info, &model.metadata), &model.metadata.name);
        debug!(kind = %self.info.kind(), id = %id, "Rendering manifest");

        let yaml = match serde_yaml::to_string(&self.manifest(&model)) {
            Ok(yaml) => yaml,
            Err(e) => {
                return ResourceResponse::failed(Diagnostic::error(
                    SUMMARY_MARSHAL,
                    format!("{} {id} could not be rendered as YAML: {e}", self.info.kind()),
                ))
            }
        };

        let mut state = config.as_object().cloned().unwrap_or_default();
        state.insert("id".to_string(), json!(id));
        state.insert("yaml".to_string(), json!(yaml));
        ResourceResponse::ok(Value::Object(state))
    }
}

#[cfg(test)]
#[path = "data_source_tests.rs"]
mod data_source_tests;
