// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Attribute schemas of the provider, its resources and data sources.
//!
//! Spec attributes are not written by hand: they are derived from the OpenAPI v3
//! schema of each CRD with [`from_json_schema`]. The wrapping attributes (`id`,
//! `metadata`, `field_manager`, waits and timeouts) are the same for every kind and
//! are added by [`resource_schema`], [`data_source_schema`] and [`manifest_schema`].
//!
//! # Type Mapping
//!
//! | OpenAPI | Attribute |
//! |---------|-----------|
//! | `string`, `x-kubernetes-int-or-string` | `String` |
//! | `integer` | `Int64` |
//! | `number` | `Float64` |
//! | `boolean` | `Bool` |
//! | `object` with `properties` | single nested attribute |
//! | `object` with `additionalProperties` | `Map` |
//! | `array` of objects | list nested attribute |
//! | `array` of scalars | `List` |
//! | `x-kubernetes-preserve-unknown-fields` | `Dynamic` |

use crate::naming::to_snake_case;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    JSONSchemaProps, JSONSchemaPropsOrArray, JSONSchemaPropsOrBool,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Type of a non-nested attribute or of the elements of a collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueType {
    String,
    Int64,
    Float64,
    Bool,
    /// Any JSON value, passed through untouched.
    Dynamic,
    List {
        element: Box<ValueType>,
    },
    Map {
        element: Box<ValueType>,
    },
}

/// How nested attributes are grouped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Nesting {
    /// A single object.
    Single,
    /// A list of objects.
    List,
}

/// Shape of an attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Value(ValueType),
    Nested {
        nesting: Nesting,
        attributes: BTreeMap<String, Attribute>,
    },
}

/// Value constraints checked during validation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "validator", rename_all = "snake_case")]
pub enum Validator {
    /// String must be one of the listed values.
    OneOf { values: Vec<String> },
    /// Number must be within the (inclusive) bounds.
    Range {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// String length bounds.
    Length {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// List length bounds.
    ItemCount {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// DNS-1123 subdomain (`metadata.name`).
    DnsSubdomain,
    /// DNS-1123 label (`metadata.namespace`).
    DnsLabel,
    /// Map keys must be qualified names (`prefix/name`).
    QualifiedKeys,
    /// Go duration string (`10m`, `1h30m`).
    Duration,
}

/// A single attribute of a schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    /// Field name on the Kubernetes side.
    pub json_name: String,
    pub kind: AttributeKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub description: String,
    /// Changing the value requires destroying and re-creating the object.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    /// Create an optional attribute of the given kind.
    #[must_use]
    pub fn new(json_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            json_name: json_name.into(),
            kind,
            required: false,
            optional: true,
            computed: false,
            description: String::new(),
            requires_replace: false,
            validators: Vec::new(),
        }
    }

    #[must_use]
    pub fn string(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeKind::Value(ValueType::String))
    }

    #[must_use]
    pub fn bool(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeKind::Value(ValueType::Bool))
    }

    #[must_use]
    pub fn int64(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeKind::Value(ValueType::Int64))
    }

    #[must_use]
    pub fn string_map(json_name: impl Into<String>) -> Self {
        Self::new(
            json_name,
            AttributeKind::Value(ValueType::Map {
                element: Box::new(ValueType::String),
            }),
        )
    }

    #[must_use]
    pub fn single_nested(
        json_name: impl Into<String>,
        attributes: BTreeMap<String, Attribute>,
    ) -> Self {
        Self::new(
            json_name,
            AttributeKind::Nested {
                nesting: Nesting::Single,
                attributes,
            },
        )
    }

    #[must_use]
    pub fn list_nested(
        json_name: impl Into<String>,
        attributes: BTreeMap<String, Attribute>,
    ) -> Self {
        Self::new(
            json_name,
            AttributeKind::Nested {
                nesting: Nesting::List,
                attributes,
            },
        )
    }

    /// Mark the attribute as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self.computed = false;
        self
    }

    /// Mark the attribute as set by the provider only.
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self
    }

    /// Mark the attribute as configurable with a provider-chosen default.
    #[must_use]
    pub fn optional_computed(mut self) -> Self {
        self.required = false;
        self.optional = true;
        self.computed = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Turn this attribute and every nested attribute into computed-only.
    #[must_use]
    pub fn into_computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self.requires_replace = false;
        self.validators.clear();
        if let AttributeKind::Nested { attributes, .. } = &mut self.kind {
            let taken = std::mem::take(attributes);
            *attributes = taken
                .into_iter()
                .map(|(name, attr)| (name, attr.into_computed()))
                .collect();
        }
        self
    }

    /// Nested attributes, if this is a nested attribute.
    #[must_use]
    pub fn attributes(&self) -> Option<&BTreeMap<String, Attribute>> {
        match &self.kind {
            AttributeKind::Nested { attributes, .. } => Some(attributes),
            AttributeKind::Value(_) => None,
        }
    }
}

/// Schema of the provider configuration, a resource or a data source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    /// Look up an attribute by dotted path (`metadata.name`).
    #[must_use]
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut segments = path.split('.');
        let mut current = self.attributes.get(segments.next()?)?;
        for segment in segments {
            current = current.attributes()?.get(segment)?;
        }
        Some(current)
    }
}

/// Complete schema reported by the provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProviderSchema {
    pub provider: Option<Schema>,
    pub resources: BTreeMap<String, Schema>,
    pub data_sources: BTreeMap<String, Schema>,
}

// ============================================================================
// OpenAPI conversion
// ============================================================================

/// Convert an OpenAPI v3 property into an attribute.
///
/// `required` tells whether the parent lists the property as required.
#[must_use]
pub fn from_json_schema(json_name: &str, props: &JSONSchemaProps, required: bool) -> Attribute {
    let props = unwrap_variants(props);

    let mut attr = Attribute::new(json_name, kind_of(&props));
    if required {
        attr = attr.required();
    }
    if let Some(description) = &props.description {
        attr.description.clone_from(description);
    }
    attr.validators = validators_of(&props);
    attr
}

/// Convert the properties of an object schema into attributes keyed by attribute name.
#[must_use]
pub fn nested_attributes(props: &JSONSchemaProps) -> BTreeMap<String, Attribute> {
    let required = props.required.clone().unwrap_or_default();

    props
        .properties
        .iter()
        .flatten()
        .map(|(json_name, sub)| {
            let is_required = required.contains(json_name);
            (
                to_snake_case(json_name),
                from_json_schema(json_name, sub, is_required),
            )
        })
        .collect()
}

/// Resolve `anyOf`/`oneOf`/`allOf` wrappers that carry a single non-null schema.
///
/// Optional enums and references are emitted this way; the outer description wins.
fn unwrap_variants(props: &JSONSchemaProps) -> JSONSchemaProps {
    if props.type_.is_some() || props.properties.is_some() {
        return props.clone();
    }

    let variants = props
        .any_of
        .as_ref()
        .or(props.one_of.as_ref())
        .or(props.all_of.as_ref());

    let Some(variants) = variants else {
        return props.clone();
    };

    let mut non_null = variants
        .iter()
        .filter(|v| v.type_.as_deref() != Some("null"));

    match (non_null.next(), non_null.next()) {
        (Some(only), None) => {
            let mut inner = unwrap_variants(only);
            if props.description.is_some() {
                inner.description.clone_from(&props.description);
            }
            inner
        }
        _ => props.clone(),
    }
}

fn is_structured_object(props: &JSONSchemaProps) -> bool {
    props
        .properties
        .as_ref()
        .is_some_and(|p| !p.is_empty())
}

fn kind_of(props: &JSONSchemaProps) -> AttributeKind {
    if props.x_kubernetes_int_or_string == Some(true) {
        return AttributeKind::Value(ValueType::String);
    }
    if props.x_kubernetes_preserve_unknown_fields == Some(true) && !is_structured_object(props) {
        return AttributeKind::Value(ValueType::Dynamic);
    }

    match props.type_.as_deref() {
        Some("array") => match item_schema(props) {
            Some(item) if is_structured_object(&item) => AttributeKind::Nested {
                nesting: Nesting::List,
                attributes: nested_attributes(&item),
            },
            Some(item) => AttributeKind::Value(ValueType::List {
                element: Box::new(element_type(&item)),
            }),
            None => AttributeKind::Value(ValueType::List {
                element: Box::new(ValueType::Dynamic),
            }),
        },
        Some("object") => {
            if is_structured_object(props) {
                AttributeKind::Nested {
                    nesting: Nesting::Single,
                    attributes: nested_attributes(props),
                }
            } else if let Some(element) = map_element(props) {
                AttributeKind::Value(ValueType::Map {
                    element: Box::new(element),
                })
            } else {
                AttributeKind::Nested {
                    nesting: Nesting::Single,
                    attributes: BTreeMap::new(),
                }
            }
        }
        None if is_structured_object(props) => AttributeKind::Nested {
            nesting: Nesting::Single,
            attributes: nested_attributes(props),
        },
        other => AttributeKind::Value(scalar_type(other)),
    }
}

fn scalar_type(type_: Option<&str>) -> ValueType {
    match type_ {
        Some("string") => ValueType::String,
        Some("integer") => ValueType::Int64,
        Some("number") => ValueType::Float64,
        Some("boolean") => ValueType::Bool,
        _ => ValueType::Dynamic,
    }
}

fn item_schema(props: &JSONSchemaProps) -> Option<JSONSchemaProps> {
    match props.items.as_ref()? {
        JSONSchemaPropsOrArray::Schema(item) => Some(unwrap_variants(item)),
        JSONSchemaPropsOrArray::Schemas(items) => items.first().map(unwrap_variants),
    }
}

fn map_element(props: &JSONSchemaProps) -> Option<ValueType> {
    match props.additional_properties.as_ref()? {
        JSONSchemaPropsOrBool::Schema(element) => Some(element_type(&unwrap_variants(element))),
        JSONSchemaPropsOrBool::Bool(true) => Some(ValueType::Dynamic),
        JSONSchemaPropsOrBool::Bool(false) => None,
    }
}

/// Element type of a collection. Structured objects inside maps and nested lists
/// have no attribute form and are carried as `Dynamic`.
fn element_type(props: &JSONSchemaProps) -> ValueType {
    if props.x_kubernetes_int_or_string == Some(true) {
        return ValueType::String;
    }
    match props.type_.as_deref() {
        Some("array") => ValueType::List {
            element: Box::new(
                item_schema(props)
                    .map(|item| element_type(&item))
                    .unwrap_or(ValueType::Dynamic),
            ),
        },
        Some("object") if !is_structured_object(props) => match map_element(props) {
            Some(element) => ValueType::Map {
                element: Box::new(element),
            },
            None => ValueType::Dynamic,
        },
        Some("object") => ValueType::Dynamic,
        other => scalar_type(other),
    }
}

fn validators_of(props: &JSONSchemaProps) -> Vec<Validator> {
    let mut validators = Vec::new();

    if let Some(values) = &props.enum_ {
        let values: Vec<String> = values
            .iter()
            .filter_map(|v| v.0.as_str().map(str::to_string))
            .collect();
        if !values.is_empty() {
            validators.push(Validator::OneOf { values });
        }
    }

    if props.minimum.is_some() || props.maximum.is_some() {
        validators.push(Validator::Range {
            min: props.minimum,
            max: props.maximum,
        });
    }

    if props.min_length.is_some() || props.max_length.is_some() {
        validators.push(Validator::Length {
            min: props.min_length,
            max: props.max_length,
        });
    }

    if props.min_items.is_some() || props.max_items.is_some() {
        validators.push(Validator::ItemCount {
            min: props.min_items,
            max: props.max_items,
        });
    }

    validators
}

// ============================================================================
// Wrapping schemas
// ============================================================================

fn object_attributes<const N: usize>(entries: [(&str, Attribute); N]) -> BTreeMap<String, Attribute> {
    entries
        .into_iter()
        .map(|(name, attr)| (name.to_string(), attr))
        .collect()
}

fn common_attributes() -> BTreeMap<String, Attribute> {
    object_attributes([
        (
            "id",
            Attribute::string("id")
                .computed()
                .with_description("Identifier of the object: 'namespace/name', or 'name' for cluster-scoped kinds."),
        ),
        (
            "api_version",
            Attribute::string("apiVersion")
                .computed()
                .with_description("API version of the object."),
        ),
        (
            "kind",
            Attribute::string("kind")
                .computed()
                .with_description("Kind of the object."),
        ),
    ])
}

fn computed_metadata_fields() -> [(&'static str, Attribute); 3] {
    [
        (
            "uid",
            Attribute::string("uid")
                .computed()
                .with_description("Unique identifier assigned by the API server."),
        ),
        (
            "resource_version",
            Attribute::string("resourceVersion")
                .computed()
                .with_description("Internal version of the object."),
        ),
        (
            "generation",
            Attribute::int64("generation")
                .computed()
                .with_description("Sequence number of the desired state."),
        ),
    ]
}

fn name_attribute() -> Attribute {
    Attribute::string("name")
        .required()
        .requires_replace()
        .with_validator(Validator::DnsSubdomain)
        .with_description("Unique name of the object within its namespace or cluster.")
}

fn namespace_attribute() -> Attribute {
    Attribute::string("namespace")
        .required()
        .requires_replace()
        .with_validator(Validator::DnsLabel)
        .with_description("Namespace of the object.")
}

fn metadata_attribute(namespaced: bool, computed_labels: bool) -> Attribute {
    let mut attributes = BTreeMap::new();
    attributes.insert("name".to_string(), name_attribute());
    if namespaced {
        attributes.insert("namespace".to_string(), namespace_attribute());
    }

    let labels = Attribute::string_map("labels").with_description(
        "Map of string keys and values used to organize and categorize objects.",
    );
    let annotations = Attribute::string_map("annotations")
        .with_description("Unstructured key value map stored with the object.");

    if computed_labels {
        attributes.insert("labels".to_string(), labels.computed());
        attributes.insert("annotations".to_string(), annotations.computed());
    } else {
        attributes.insert(
            "labels".to_string(),
            labels.with_validator(Validator::QualifiedKeys),
        );
        attributes.insert(
            "annotations".to_string(),
            annotations.with_validator(Validator::QualifiedKeys),
        );
    }

    for (name, attr) in computed_metadata_fields() {
        attributes.insert(name.to_string(), attr);
    }

    Attribute::single_nested("metadata", attributes)
        .required()
        .with_description("Standard object metadata.")
}

/// Schema of a resource managing one kind.
#[must_use]
pub fn resource_schema(description: &str, namespaced: bool, spec: Option<&Attribute>) -> Schema {
    let mut attributes = common_attributes();

    attributes.insert(
        "field_manager".to_string(),
        Attribute::string("fieldManager")
            .optional_computed()
            .with_validator(Validator::Length {
                min: Some(1),
                max: Some(128),
            })
            .with_description("Field manager used for server-side apply. Defaults to the provider's field manager."),
    );
    attributes.insert(
        "force_conflicts".to_string(),
        Attribute::bool("force")
            .optional_computed()
            .with_description("Take ownership of fields managed by another field manager instead of failing. Defaults to false."),
    );
    attributes.insert(
        "wait_for_upsert".to_string(),
        Attribute::list_nested(
            "waitForUpsert",
            object_attributes([
                (
                    "jsonpath",
                    Attribute::string("jsonpath")
                        .required()
                        .with_description("Path into the object, e.g. '{.status.conditions[?(@.type==\"Ready\")].status}'."),
                ),
                (
                    "value",
                    Attribute::string("value")
                        .required()
                        .with_description("Expected value at the path."),
                ),
            ]),
        )
        .with_description("Conditions that must hold after create and update before the operation completes."),
    );
    attributes.insert(
        "wait_for_delete".to_string(),
        Attribute::bool("waitForDelete")
            .with_description("Wait until the object is gone from the API server after delete."),
    );
    attributes.insert(
        "timeouts".to_string(),
        Attribute::single_nested(
            "timeouts",
            object_attributes(["create", "update", "delete"].map(|op| {
                (
                    op,
                    Attribute::string(op)
                        .with_validator(Validator::Duration)
                        .with_description(format!("Go duration to wait during {op}, e.g. '10m'.")),
                )
            })),
        )
        .with_description("Timeouts of the wait conditions."),
    );
    attributes.insert("metadata".to_string(), metadata_attribute(namespaced, false));

    if let Some(spec) = spec {
        attributes.insert("spec".to_string(), spec.clone());
    }

    Schema {
        version: crate::constants::SCHEMA_VERSION,
        description: description.to_string(),
        attributes,
    }
}

/// Schema of a data source reading one kind.
#[must_use]
pub fn data_source_schema(description: &str, namespaced: bool, spec: Option<&Attribute>) -> Schema {
    let mut attributes = common_attributes();
    attributes.insert("metadata".to_string(), metadata_attribute(namespaced, true));

    if let Some(spec) = spec {
        attributes.insert("spec".to_string(), spec.clone().into_computed());
    }

    Schema {
        version: crate::constants::SCHEMA_VERSION,
        description: description.to_string(),
        attributes,
    }
}

/// Schema of a data source rendering one kind as a YAML manifest.
#[must_use]
pub fn manifest_schema(description: &str, namespaced: bool, spec: Option<&Attribute>) -> Schema {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        "id".to_string(),
        Attribute::string("id")
            .computed()
            .with_description("Identifier of the object: 'namespace/name', or 'name' for cluster-scoped kinds."),
    );

    let mut metadata = metadata_attribute(namespaced, false);
    if let AttributeKind::Nested { attributes, .. } = &mut metadata.kind {
        for (name, _) in computed_metadata_fields() {
            attributes.remove(name);
        }
    }
    attributes.insert("metadata".to_string(), metadata);

    if let Some(spec) = spec {
        attributes.insert("spec".to_string(), spec.clone());
    }
    attributes.insert(
        "yaml".to_string(),
        Attribute::string("yaml")
            .computed()
            .with_description("The object rendered as a YAML manifest."),
    );

    Schema {
        version: crate::constants::SCHEMA_VERSION,
        description: format!("{description} Renders a manifest without contacting the API server."),
        attributes,
    }
}

/// Schema of the provider configuration block.
#[must_use]
pub fn provider_schema() -> Schema {
    Schema {
        version: crate::constants::SCHEMA_VERSION,
        description: "Manage the OpenShift Hive custom resources of a Kubernetes cluster.".to_string(),
        attributes: object_attributes([
            (
                "kubeconfig",
                Attribute::string("kubeconfig")
                    .with_description("Path of the kubeconfig file. Defaults to $KUBECONFIG, then in-cluster or ~/.kube/config."),
            ),
            (
                "context",
                Attribute::string("context")
                    .with_description("Kubeconfig context to use. Defaults to the current context."),
            ),
            (
                "field_manager",
                Attribute::string("fieldManager")
                    .with_description("Default field manager for server-side apply."),
            ),
            (
                "offline",
                Attribute::bool("offline")
                    .with_description("Do not contact any API server. Only manifest data sources work."),
            ),
        ]),
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod schema_tests;
