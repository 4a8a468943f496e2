// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Schema-guided translation of values between state and Kubernetes objects.
//!
//! State values use attribute names (`cluster_name`), Kubernetes objects use JSON
//! names (`clusterName`). The attribute tree decides which keys are renamed: nested
//! attributes are renamed recursively, while maps and `Dynamic` values are carried
//! as-is because their keys are data, not field names.
//!
//! # Example
//!
//! ```rust
//! use hive_provider::convert::{from_kubernetes, to_kubernetes};
//! use hive_provider::schema::Attribute;
//! use serde_json::json;
//! use std::collections::BTreeMap;
//!
//! let attrs = BTreeMap::from([
//!     ("cluster_name".to_string(), Attribute::string("clusterName")),
//!     ("labels".to_string(), Attribute::string_map("labels")),
//! ]);
//!
//! let state = json!({"cluster_name": "c1", "labels": {"app.kubernetes.io/name": "x"}});
//! let object = to_kubernetes(&state, &attrs);
//! assert_eq!(object, json!({"clusterName": "c1", "labels": {"app.kubernetes.io/name": "x"}}));
//!
//! assert_eq!(from_kubernetes(&object, &attrs), state);
//! ```

use crate::schema::{Attribute, AttributeKind, Nesting, ValueType};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Translate a state object into a Kubernetes object.
///
/// Keys are renamed to JSON names and null values are dropped, so optional
/// attributes left unset are omitted from the applied object. Keys that are not
/// declared attributes are dropped.
#[must_use]
pub fn to_kubernetes(value: &Value, attributes: &BTreeMap<String, Attribute>) -> Value {
    let Some(object) = value.as_object() else {
        return Value::Null;
    };

    let mut out = Map::new();
    for (name, attr) in attributes {
        let Some(field) = object.get(name) else {
            continue;
        };
        let converted = attribute_to_kubernetes(field, attr);
        if !converted.is_null() {
            out.insert(attr.json_name.clone(), converted);
        }
    }
    Value::Object(out)
}

fn attribute_to_kubernetes(value: &Value, attr: &Attribute) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match &attr.kind {
        AttributeKind::Value(value_type) => value_to_kubernetes(value, value_type),
        AttributeKind::Nested {
            nesting: Nesting::Single,
            attributes,
        } => to_kubernetes(value, attributes),
        AttributeKind::Nested {
            nesting: Nesting::List,
            attributes,
        } => match value.as_array() {
            Some(items) => Value::Array(
                items
                    .iter()
                    .map(|item| to_kubernetes(item, attributes))
                    .collect(),
            ),
            None => Value::Null,
        },
    }
}

fn value_to_kubernetes(value: &Value, value_type: &ValueType) -> Value {
    match (value_type, value) {
        (ValueType::List { element }, Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| value_to_kubernetes(item, element))
                .collect(),
        ),
        (ValueType::Map { element }, Value::Object(entries)) => Value::Object(
            entries
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), value_to_kubernetes(v, element)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Translate a Kubernetes object into a state object.
///
/// Every declared attribute is present in the result; fields absent from the
/// object become `null`. Fields the schema does not declare are dropped.
#[must_use]
pub fn from_kubernetes(value: &Value, attributes: &BTreeMap<String, Attribute>) -> Value {
    let empty = Map::new();
    let object = value.as_object().unwrap_or(&empty);

    let out: Map<String, Value> = attributes
        .iter()
        .map(|(name, attr)| {
            let field = object
                .get(&attr.json_name)
                .map_or(Value::Null, |v| attribute_from_kubernetes(v, attr));
            (name.clone(), field)
        })
        .collect();
    Value::Object(out)
}

fn attribute_from_kubernetes(value: &Value, attr: &Attribute) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match &attr.kind {
        AttributeKind::Value(value_type) => value_from_kubernetes(value, value_type),
        AttributeKind::Nested {
            nesting: Nesting::Single,
            attributes,
        } => {
            if value.is_object() {
                from_kubernetes(value, attributes)
            } else {
                Value::Null
            }
        }
        AttributeKind::Nested {
            nesting: Nesting::List,
            attributes,
        } => match value.as_array() {
            Some(items) => Value::Array(
                items
                    .iter()
                    .map(|item| from_kubernetes(item, attributes))
                    .collect(),
            ),
            None => Value::Null,
        },
    }
}

fn value_from_kubernetes(value: &Value, value_type: &ValueType) -> Value {
    match (value_type, value) {
        // int-or-string fields come back as numbers when set to a number
        (ValueType::String, Value::Number(n)) => Value::String(n.to_string()),
        (ValueType::String, Value::Bool(b)) => Value::String(b.to_string()),
        (ValueType::List { element }, Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| value_from_kubernetes(item, element))
                .collect(),
        ),
        (ValueType::Map { element }, Value::Object(entries)) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), value_from_kubernetes(v, element)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Remove null members from objects, recursively.
///
/// Used when rendering manifests so unset optional attributes don't appear as `null`.
#[must_use]
pub fn prune_nulls(value: &Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(prune_nulls).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod convert_tests;
