// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name translation between Kubernetes and provider conventions.
//!
//! Kubernetes fields are `camelCase` (often with upper-case acronyms such as
//! `manageDNS` or `infraID`) while provider attributes are `snake_case`. Type names
//! are derived from the CRD kind and version, and resource identifiers from the
//! object's namespace and name.

use crate::constants::{MANIFEST_SUFFIX, PROVIDER_TYPE_NAME};
use thiserror::Error;

/// Errors returned when parsing an import identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// Namespaced objects are imported as `namespace/name`
    #[error("Expected import identifier with format 'namespace/name', got '{0}'")]
    ExpectedNamespaced(String),

    /// Cluster-scoped objects are imported by name only
    #[error("Expected import identifier with format 'name', got '{0}'")]
    ExpectedClusterScoped(String),
}

/// Convert a Kubernetes field name to a `snake_case` attribute name.
///
/// Runs of upper-case letters are treated as a single word, so acronyms stay
/// together: `manageDNS` becomes `manage_dns` and `IPAddress` becomes `ip_address`.
/// Dashes and dots become underscores.
///
/// # Example
///
/// ```rust
/// use hive_provider::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("clusterName"), "cluster_name");
/// assert_eq!(to_snake_case("manageDNS"), "manage_dns");
/// assert_eq!(to_snake_case("infraID"), "infra_id");
/// assert_eq!(to_snake_case("kmsKeyARN"), "kms_key_arn");
/// ```
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '.' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            let ends_acronym = prev.is_some_and(|p| p.is_ascii_uppercase())
                && next.is_some_and(|n| n.is_ascii_lowercase());

            if (after_lower || ends_acronym) && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Type name of the resource and data source for a kind and version.
///
/// ```rust
/// use hive_provider::naming::type_name;
///
/// assert_eq!(type_name("ClusterDeployment", "v1"), "hive_cluster_deployment_v1");
/// assert_eq!(type_name("DNSZone", "v1"), "hive_dns_zone_v1");
/// ```
#[must_use]
pub fn type_name(kind: &str, version: &str) -> String {
    format!("{PROVIDER_TYPE_NAME}_{}_{version}", to_snake_case(kind))
}

/// Type name of the manifest data source for a kind and version.
#[must_use]
pub fn manifest_type_name(kind: &str, version: &str) -> String {
    format!("{}{MANIFEST_SUFFIX}", type_name(kind, version))
}

/// State identifier of an object: `namespace/name`, or `name` for cluster-scoped kinds.
#[must_use]
pub fn object_id(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}/{name}"),
        None => name.to_string(),
    }
}

/// Parse an import identifier into `(namespace, name)`.
///
/// # Errors
///
/// Returns an error if the identifier does not match the scope of the kind
/// or contains empty parts.
pub fn parse_import_id(id: &str, namespaced: bool) -> Result<(Option<String>, String), IdError> {
    let parts: Vec<&str> = id.split('/').collect();

    if namespaced {
        match parts.as_slice() {
            [ns, name] if !ns.is_empty() && !name.is_empty() => {
                Ok((Some((*ns).to_string()), (*name).to_string()))
            }
            _ => Err(IdError::ExpectedNamespaced(id.to_string())),
        }
    } else {
        match parts.as_slice() {
            [name] if !name.is_empty() => Ok((None, (*name).to_string())),
            _ => Err(IdError::ExpectedClusterScoped(id.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod naming_tests;
