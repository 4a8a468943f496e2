// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ObjectClient`] for tests and dry runs.
//!
//! Objects are tracked by API version, plural, namespace and name. The tracker
//! mimics the parts of the API server the provider relies on:
//!
//! - `uid`, `resourceVersion`, `generation` and `creationTimestamp` are assigned
//!   on write
//! - server-side apply tracks the managers of each top-level `spec` field and of
//!   each label and annotation; changing a field owned by another manager fails
//!   with a conflict unless forced, and fields a manager stops applying are removed
//! - `status` is never written by apply, only by [`InMemoryObjectClient::set_status`]
//! - deletion can be delayed: the object stays readable with a
//!   `deletionTimestamp` for a configured number of reads, like an object held
//!   by finalizers
//! - errors can be injected per operation

use crate::client::{display_name, ApplyParams, ClientError, ObjectClient};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use kube::core::{ApiResource, DynamicObject};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tokio::sync::Mutex;
use tracing::trace;

/// Client operations, for error injection and call counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Get,
    Apply,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    api_version: String,
    plural: String,
    namespace: Option<String>,
    name: String,
}

impl ObjectKey {
    fn new(resource: &ApiResource, namespace: Option<&str>, name: &str) -> Self {
        Self {
            api_version: resource.api_version.clone(),
            plural: resource.plural.clone(),
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// A field tracked for server-side apply ownership.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum FieldKey {
    Spec(String),
    Label(String),
    Annotation(String),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(k) => write!(f, ".spec.{k}"),
            Self::Label(k) => write!(f, ".metadata.labels.{k}"),
            Self::Annotation(k) => write!(f, ".metadata.annotations.{k}"),
        }
    }
}

impl FieldKey {
    /// Parent object of the field and the key within it.
    fn location(&self) -> ([&'static str; 2], &str) {
        match self {
            Self::Spec(k) => (["spec", ""], k),
            Self::Label(k) => (["metadata", "labels"], k),
            Self::Annotation(k) => (["metadata", "annotations"], k),
        }
    }

    fn get<'a>(&self, object: &'a Value) -> Option<&'a Value> {
        let ([outer, inner], key) = self.location();
        let mut parent = object.get(outer)?;
        if !inner.is_empty() {
            parent = parent.get(inner)?;
        }
        parent.get(key)
    }

    fn set(&self, object: &mut Value, value: Value) {
        let ([outer, inner], key) = self.location();
        let mut current = object;
        for segment in [outer, inner].into_iter().filter(|s| !s.is_empty()) {
            if !current.get(segment).is_some_and(Value::is_object) {
                current[segment] = Value::Object(Map::new());
            }
            current = &mut current[segment];
        }
        current[key] = value;
    }

    fn remove(&self, object: &mut Value) {
        let ([outer, inner], key) = self.location();
        let Some(mut parent) = object.get_mut(outer) else {
            return;
        };
        if !inner.is_empty() {
            let Some(nested) = parent.get_mut(inner) else {
                return;
            };
            parent = nested;
        }
        if let Value::Object(map) = parent {
            map.remove(key);
        }
    }
}

/// Fields of an applied object subject to ownership tracking.
fn applied_fields(object: &Value) -> BTreeMap<FieldKey, Value> {
    let mut fields = BTreeMap::new();
    let entries = |v: Option<&Value>| {
        v.and_then(Value::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Vec<_>>())
            .unwrap_or_default()
    };

    for (k, v) in entries(object.get("spec")) {
        fields.insert(FieldKey::Spec(k), v);
    }
    for (k, v) in entries(object.pointer("/metadata/labels")) {
        fields.insert(FieldKey::Label(k), v);
    }
    for (k, v) in entries(object.pointer("/metadata/annotations")) {
        fields.insert(FieldKey::Annotation(k), v);
    }
    fields
}

#[derive(Debug)]
struct StoredObject {
    data: Value,
    managers: BTreeMap<FieldKey, BTreeSet<String>>,
    /// Reads left before a deleted object disappears.
    deletion_reads_left: Option<u32>,
}

#[derive(Debug)]
struct InjectedError {
    operation: Operation,
    code: u16,
    message: String,
    remaining: u32,
}

impl InjectedError {
    fn to_error(&self, kind: &str, name: &str) -> ClientError {
        match self.code {
            404 => ClientError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            409 => ClientError::Conflict(self.message.clone()),
            0 => ClientError::Transport(self.message.clone()),
            code => ClientError::Api {
                code,
                reason: "Injected".to_string(),
                message: self.message.clone(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    objects: BTreeMap<ObjectKey, StoredObject>,
    resource_version: u64,
    uid_counter: u64,
    deletion_reads: u32,
    injected: Vec<InjectedError>,
    calls: BTreeMap<Operation, usize>,
}

impl Store {
    fn next_resource_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }

    fn next_uid(&mut self) -> String {
        self.uid_counter += 1;
        format!("00000000-0000-4000-8000-{:012x}", self.uid_counter)
    }

    /// Record the call and return an injected error, if one is pending.
    fn begin(&mut self, operation: Operation, kind: &str, name: &str) -> Result<(), ClientError> {
        *self.calls.entry(operation).or_default() += 1;

        let Some(index) = self
            .injected
            .iter()
            .position(|e| e.operation == operation && e.remaining > 0)
        else {
            return Ok(());
        };

        let injected = &mut self.injected[index];
        injected.remaining -= 1;
        let err = injected.to_error(kind, name);
        if injected.remaining == 0 {
            self.injected.remove(index);
        }
        Err(err)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn to_dynamic(data: &Value) -> Result<DynamicObject, ClientError> {
    Ok(serde_json::from_value(data.clone())?)
}

/// In-memory [`ObjectClient`].
#[derive(Debug, Default)]
pub struct InMemoryObjectClient {
    store: Mutex<Store>,
}

impl InMemoryObjectClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep deleted objects readable, with a `deletionTimestamp`, for `reads` GETs.
    #[must_use]
    pub fn with_deletion_reads(mut self, reads: u32) -> Self {
        self.store.get_mut().deletion_reads = reads;
        self
    }

    /// Fail the next `times` calls of `operation`.
    ///
    /// Code 404 fails with `NotFound`, 409 with `Conflict`, 0 with a transport
    /// error; any other code with an API error of that code.
    pub async fn inject_error(&self, operation: Operation, code: u16, message: &str, times: u32) {
        self.store.lock().await.injected.push(InjectedError {
            operation,
            code,
            message: message.to_string(),
            remaining: times,
        });
    }

    /// Replace the status of a stored object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the object does not exist.
    pub async fn set_status(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        status: Value,
    ) -> Result<(), ClientError> {
        let mut store = self.store.lock().await;
        let resource_version = store.next_resource_version();
        let stored = store
            .objects
            .get_mut(&ObjectKey::new(resource, namespace, name))
            .ok_or_else(|| ClientError::NotFound {
                kind: resource.kind.clone(),
                name: display_name(namespace, name),
            })?;

        stored.data["status"] = status;
        stored.data["metadata"]["resourceVersion"] = Value::String(resource_version);
        Ok(())
    }

    /// Number of calls made for `operation`.
    pub async fn calls(&self, operation: Operation) -> usize {
        self.store
            .lock()
            .await
            .calls
            .get(&operation)
            .copied()
            .unwrap_or_default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.store.lock().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Names of the managers of each tracked field of an object, keyed by field path.
    pub async fn managed_fields(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> BTreeMap<String, Vec<String>> {
        let store = self.store.lock().await;
        store
            .objects
            .get(&ObjectKey::new(resource, namespace, name))
            .map(|stored| {
                stored
                    .managers
                    .iter()
                    .map(|(field, managers)| (field.to_string(), managers.iter().cloned().collect()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn new_object(
    store: &mut Store,
    resource: &ApiResource,
    namespace: Option<&str>,
    name: &str,
    applied: &Value,
) -> Value {
    let mut metadata = Map::new();
    metadata.insert("name".to_string(), Value::String(name.to_string()));
    if let Some(ns) = namespace {
        metadata.insert("namespace".to_string(), Value::String(ns.to_string()));
    }
    metadata.insert("uid".to_string(), Value::String(store.next_uid()));
    metadata.insert("generation".to_string(), Value::from(1));
    metadata.insert("creationTimestamp".to_string(), Value::String(now()));

    let mut data = Map::new();
    data.insert(
        "apiVersion".to_string(),
        Value::String(resource.api_version.clone()),
    );
    data.insert("kind".to_string(), Value::String(resource.kind.clone()));
    data.insert("metadata".to_string(), Value::Object(metadata));
    if let Some(spec) = applied.get("spec") {
        data.insert("spec".to_string(), spec.clone());
    }
    Value::Object(data)
}

fn conflict_message(conflicts: &[(FieldKey, String)]) -> String {
    let listed: Vec<String> = conflicts
        .iter()
        .map(|(field, manager)| format!("conflict with \"{manager}\": {field}"))
        .collect();
    format!(
        "Apply failed with {} conflict{}: {}",
        conflicts.len(),
        if conflicts.len() == 1 { "" } else { "s" },
        listed.join(", ")
    )
}

#[async_trait]
impl ObjectClient for InMemoryObjectClient {
    async fn get(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ClientError> {
        let shown = display_name(namespace, name);
        let mut guard = self.store.lock().await;
        let store = &mut *guard;
        store.begin(Operation::Get, &resource.kind, &shown)?;

        let key = ObjectKey::new(resource, namespace, name);
        let not_found = || ClientError::NotFound {
            kind: resource.kind.clone(),
            name: shown.clone(),
        };

        let reads_left = store
            .objects
            .get(&key)
            .ok_or_else(not_found)?
            .deletion_reads_left;

        if reads_left == Some(0) {
            store.objects.remove(&key);
            trace!(kind = %resource.kind, name = %shown, "Deleted object finalized");
            return Err(not_found());
        }

        let stored = store.objects.get_mut(&key).ok_or_else(not_found)?;
        if let Some(left) = reads_left {
            stored.deletion_reads_left = Some(left - 1);
        }
        to_dynamic(&stored.data)
    }

    async fn apply(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        object: &DynamicObject,
        params: &ApplyParams,
    ) -> Result<DynamicObject, ClientError> {
        let name = object.metadata.name.clone().unwrap_or_default();
        let shown = display_name(namespace, &name);
        let mut guard = self.store.lock().await;
        let store = &mut *guard;
        store.begin(Operation::Apply, &resource.kind, &shown)?;

        if name.is_empty() {
            return Err(ClientError::Api {
                code: 422,
                reason: "Invalid".to_string(),
                message: "metadata.name: Required value: name is required".to_string(),
            });
        }
        if let (Some(object_ns), Some(ns)) = (object.metadata.namespace.as_deref(), namespace) {
            if object_ns != ns {
                return Err(ClientError::Api {
                    code: 400,
                    reason: "BadRequest".to_string(),
                    message: format!(
                        "the namespace of the object ({object_ns}) does not match the namespace on the request ({ns})"
                    ),
                });
            }
        }

        let applied = serde_json::to_value(object)?;
        let fields = applied_fields(&applied);
        let manager = params.field_manager.as_str();
        let key = ObjectKey::new(resource, namespace, &name);
        let resource_version = store.next_resource_version();

        let data = if let Some(stored) = store.objects.get_mut(&key) {
            let conflicts: Vec<(FieldKey, String)> = fields
                .iter()
                .filter(|(field, value)| field.get(&stored.data) != Some(*value))
                .filter_map(|(field, _)| {
                    let owners = stored.managers.get(field)?;
                    owners
                        .iter()
                        .find(|owner| owner.as_str() != manager)
                        .map(|owner| (field.clone(), owner.clone()))
                })
                .collect();

            if !conflicts.is_empty() && !params.force {
                return Err(ClientError::Conflict(conflict_message(&conflicts)));
            }

            let spec_before = stored.data.get("spec").cloned();

            // Fields this manager no longer applies
            let released: Vec<FieldKey> = stored
                .managers
                .iter()
                .filter(|(field, owners)| owners.contains(manager) && !fields.contains_key(*field))
                .map(|(field, _)| field.clone())
                .collect();
            for field in released {
                if let Some(owners) = stored.managers.get_mut(&field) {
                    owners.remove(manager);
                    if owners.is_empty() {
                        stored.managers.remove(&field);
                        field.remove(&mut stored.data);
                    }
                }
            }

            for (field, value) in &fields {
                let unchanged = field.get(&stored.data) == Some(value);
                let owners = stored.managers.entry(field.clone()).or_default();
                if !unchanged {
                    owners.clear();
                }
                owners.insert(manager.to_string());
                field.set(&mut stored.data, value.clone());
            }

            if stored.data.get("spec") != spec_before.as_ref() {
                let generation = stored.data["metadata"]["generation"].as_i64().unwrap_or(0);
                stored.data["metadata"]["generation"] = Value::from(generation + 1);
            }
            stored.data["metadata"]["resourceVersion"] = Value::String(resource_version);
            stored.data.clone()
        } else {
            let mut data = new_object(store, resource, namespace, &name, &applied);
            for (field, value) in &fields {
                field.set(&mut data, value.clone());
            }
            data["metadata"]["resourceVersion"] = Value::String(resource_version);

            let managers = fields
                .keys()
                .map(|field| (field.clone(), BTreeSet::from([manager.to_string()])))
                .collect();
            store.objects.insert(
                key,
                StoredObject {
                    data: data.clone(),
                    managers,
                    deletion_reads_left: None,
                },
            );
            data
        };

        trace!(kind = %resource.kind, name = %shown, manager = %manager, "Applied object");
        to_dynamic(&data)
    }

    async fn delete(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ClientError> {
        let shown = display_name(namespace, name);
        let mut guard = self.store.lock().await;
        let store = &mut *guard;
        store.begin(Operation::Delete, &resource.kind, &shown)?;

        let key = ObjectKey::new(resource, namespace, name);
        if !store.objects.contains_key(&key) {
            return Err(ClientError::NotFound {
                kind: resource.kind.clone(),
                name: shown,
            });
        }

        let reads = store.deletion_reads;
        if reads == 0 {
            store.objects.remove(&key);
            return Ok(());
        }

        let resource_version = store.next_resource_version();
        if let Some(stored) = store.objects.get_mut(&key) {
            if stored.deletion_reads_left.is_none() {
                stored.deletion_reads_left = Some(reads);
                stored.data["metadata"]["deletionTimestamp"] = Value::String(now());
                stored.data["metadata"]["resourceVersion"] = Value::String(resource_version);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
