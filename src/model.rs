// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed views of the wrapping attributes shared by every resource.
//!
//! The `spec` subtree differs per kind and stays a JSON value; everything around
//! it (`metadata`, field manager, waits, timeouts) has a fixed shape and is read
//! into these types.

use crate::constants::{DEFAULT_DELETE_TIMEOUT_SECS, DEFAULT_UPSERT_TIMEOUT_SECS};
use crate::duration::parse_duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// `metadata` attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataModel {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
}

/// One `wait_for_upsert` rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitRule {
    pub jsonpath: String,
    pub value: String,
}

/// `timeouts` attribute, Go durations per operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
}

fn timeout_or(value: Option<&str>, default_secs: u64) -> Duration {
    value
        .and_then(|v| parse_duration(v).ok())
        .unwrap_or(Duration::from_secs(default_secs))
}

impl Timeouts {
    #[must_use]
    pub fn create(&self) -> Duration {
        timeout_or(self.create.as_deref(), DEFAULT_UPSERT_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn update(&self) -> Duration {
        timeout_or(self.update.as_deref(), DEFAULT_UPSERT_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn delete(&self) -> Duration {
        timeout_or(self.delete.as_deref(), DEFAULT_DELETE_TIMEOUT_SECS)
    }
}

/// Resource state or plan, with `spec` kept as attribute-named JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_conflicts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_upsert: Option<Vec<WaitRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<Timeouts>,
    #[serde(default)]
    pub metadata: MetadataModel,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}

impl ResourceModel {
    /// Wait rules, empty if none are configured.
    #[must_use]
    pub fn wait_rules(&self) -> &[WaitRule] {
        self.wait_for_upsert.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts.clone().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
