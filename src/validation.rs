// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Validation of configuration values against attribute schemas.
//!
//! [`validate`] walks a configuration value alongside its attributes and reports
//! every problem it finds as an attribute diagnostic, so the host can point at
//! the offending line. Validation does not stop at the first error.

use crate::constants::{MAX_DNS_LABEL_LENGTH, MAX_DNS_SUBDOMAIN_LENGTH};
use crate::diagnostics::Diagnostics;
use crate::duration::parse_duration;
use crate::schema::{Attribute, AttributeKind, Nesting, Validator, ValueType};
use serde_json::Value;
use std::collections::BTreeMap;

const SUMMARY_MISSING: &str = "Missing required attribute";
const SUMMARY_TYPE: &str = "Incorrect attribute value type";
const SUMMARY_INVALID: &str = "Invalid attribute value";

/// Validate an object value against a set of attributes.
///
/// `path` is the attribute path of `value` itself (empty for the root).
#[must_use]
pub fn validate(value: &Value, attributes: &BTreeMap<String, Attribute>, path: &str) -> Diagnostics {
    let mut diags = Diagnostics::new();
    validate_object(value, attributes, path, &mut diags);
    diags
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn validate_object(
    value: &Value,
    attributes: &BTreeMap<String, Attribute>,
    path: &str,
    diags: &mut Diagnostics,
) {
    let Some(object) = value.as_object() else {
        diags.attribute_error(
            path,
            SUMMARY_TYPE,
            format!("Expected an object, got {}.", type_label(value)),
        );
        return;
    };

    for (name, attr) in attributes {
        let attr_path = join(path, name);
        match object.get(name) {
            None | Some(Value::Null) => {
                if attr.required {
                    diags.attribute_error(
                        &attr_path,
                        SUMMARY_MISSING,
                        format!("The attribute '{attr_path}' is required, but no definition was found."),
                    );
                }
            }
            Some(field) => validate_attribute(field, attr, &attr_path, diags),
        }
    }
}

fn validate_attribute(value: &Value, attr: &Attribute, path: &str, diags: &mut Diagnostics) {
    let well_typed = match &attr.kind {
        AttributeKind::Value(value_type) => check_type(value, value_type, path, diags),
        AttributeKind::Nested {
            nesting: Nesting::Single,
            attributes,
        } => {
            validate_object(value, attributes, path, diags);
            value.is_object()
        }
        AttributeKind::Nested {
            nesting: Nesting::List,
            attributes,
        } => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    validate_object(item, attributes, &format!("{path}[{index}]"), diags);
                }
                true
            }
            None => {
                diags.attribute_error(
                    path,
                    SUMMARY_TYPE,
                    format!("Expected a list, got {}.", type_label(value)),
                );
                false
            }
        },
    };

    if well_typed {
        for validator in &attr.validators {
            if let Some(detail) = check_validator(value, validator) {
                diags.attribute_error(path, SUMMARY_INVALID, detail);
            }
        }
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Returns whether the value has the expected type, reporting mismatches.
fn check_type(value: &Value, value_type: &ValueType, path: &str, diags: &mut Diagnostics) -> bool {
    let (ok, expected) = match value_type {
        ValueType::Dynamic => return true,
        ValueType::String => (value.is_string(), "string"),
        ValueType::Int64 => (value.is_i64() || value.is_u64(), "whole number"),
        ValueType::Float64 => (value.is_number(), "number"),
        ValueType::Bool => (value.is_boolean(), "bool"),
        ValueType::List { element } => match value.as_array() {
            Some(items) => {
                let mut all = true;
                for (index, item) in items.iter().enumerate() {
                    all &= check_type(item, element, &format!("{path}[{index}]"), diags);
                }
                return all;
            }
            None => (false, "list"),
        },
        ValueType::Map { element } => match value.as_object() {
            Some(entries) => {
                let mut all = true;
                for (key, item) in entries.iter().filter(|(_, v)| !v.is_null()) {
                    all &= check_type(item, element, &format!("{path}[\"{key}\"]"), diags);
                }
                return all;
            }
            None => (false, "map"),
        },
    };

    if !ok {
        diags.attribute_error(
            path,
            SUMMARY_TYPE,
            format!("Expected {expected}, got {}.", type_label(value)),
        );
    }
    ok
}

/// Returns a detail message when the value violates the validator.
fn check_validator(value: &Value, validator: &Validator) -> Option<String> {
    match validator {
        Validator::OneOf { values } => {
            let s = value.as_str()?;
            (!values.iter().any(|v| v == s))
                .then(|| format!("Value '{s}' must be one of: {}.", values.join(", ")))
        }
        Validator::Range { min, max } => {
            let n = value.as_f64()?;
            if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                Some(format!("Value {n} must be {}.", bounds_label(*min, *max)))
            } else {
                None
            }
        }
        Validator::Length { min, max } => {
            let len = i64::try_from(value.as_str()?.chars().count()).ok()?;
            out_of_bounds(len, *min, *max)
                .then(|| format!("String length {len} must be {}.", bounds_label(*min, *max)))
        }
        Validator::ItemCount { min, max } => {
            let len = i64::try_from(value.as_array()?.len()).ok()?;
            out_of_bounds(len, *min, *max)
                .then(|| format!("List has {len} items; the count must be {}.", bounds_label(*min, *max)))
        }
        Validator::DnsSubdomain => {
            let s = value.as_str()?;
            (!is_dns_subdomain(s)).then(|| {
                format!(
                    "'{s}' must be a lowercase RFC 1123 subdomain of at most {MAX_DNS_SUBDOMAIN_LENGTH} characters: alphanumerics, '-' and '.', starting and ending with an alphanumeric."
                )
            })
        }
        Validator::DnsLabel => {
            let s = value.as_str()?;
            (!is_dns_label(s)).then(|| {
                format!(
                    "'{s}' must be a lowercase RFC 1123 label of at most {MAX_DNS_LABEL_LENGTH} characters: alphanumerics and '-', starting and ending with an alphanumeric."
                )
            })
        }
        Validator::QualifiedKeys => {
            let invalid: Vec<&str> = value
                .as_object()?
                .keys()
                .map(String::as_str)
                .filter(|k| !is_qualified_name(k))
                .collect();
            (!invalid.is_empty()).then(|| {
                format!(
                    "Keys must be qualified names ('prefix/name' with an optional DNS subdomain prefix and a name of at most {MAX_DNS_LABEL_LENGTH} characters): {}.",
                    invalid.join(", ")
                )
            })
        }
        Validator::Duration => {
            let s = value.as_str()?;
            parse_duration(s).err().map(|e| e.to_string())
        }
    }
}

fn out_of_bounds(n: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max)
}

fn bounds_label<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("between {min} and {max}"),
        (Some(min), None) => format!("at least {min}"),
        (None, Some(max)) => format!("at most {max}"),
        (None, None) => "unbounded".to_string(),
    }
}

// ============================================================================
// Kubernetes name rules
// ============================================================================

fn is_lower_alphanumeric(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Lowercase alphanumerics and '-', alphanumeric at both ends. No length limit.
fn is_label_shaped(s: &str) -> bool {
    let (Some(first), Some(last)) = (s.chars().next(), s.chars().last()) else {
        return false;
    };
    is_lower_alphanumeric(first)
        && is_lower_alphanumeric(last)
        && s.chars().all(|c| is_lower_alphanumeric(c) || c == '-')
}

/// RFC 1123 label, as required for namespaces.
#[must_use]
pub fn is_dns_label(s: &str) -> bool {
    s.len() <= MAX_DNS_LABEL_LENGTH && is_label_shaped(s)
}

/// RFC 1123 subdomain, as required for most object names.
#[must_use]
pub fn is_dns_subdomain(s: &str) -> bool {
    s.len() <= MAX_DNS_SUBDOMAIN_LENGTH && s.split('.').all(is_label_shaped)
}

/// Qualified name as used for label and annotation keys: `[prefix/]name`.
#[must_use]
pub fn is_qualified_name(s: &str) -> bool {
    let name = match s.split_once('/') {
        Some((prefix, name)) => {
            if !is_dns_subdomain(prefix) {
                return false;
            }
            name
        }
        None => s,
    };

    let (Some(first), Some(last)) = (name.chars().next(), name.chars().last()) else {
        return false;
    };
    name.len() <= MAX_DNS_LABEL_LENGTH
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
