// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Polling for `wait_for_upsert` and `wait_for_delete`.

use crate::client::{display_name, ClientError, ObjectClient};
use crate::field_path::{FieldPath, FieldPathError};
use crate::model::WaitRule;
use kube::core::{ApiResource, DynamicObject};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Errors while waiting for an object.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("invalid jsonpath '{jsonpath}': {source}")]
    InvalidRule {
        jsonpath: String,
        #[source]
        source: FieldPathError,
    },

    #[error("timed out after {timeout:?} waiting for {name}: {}", .unmatched.join("; "))]
    Timeout {
        name: String,
        timeout: Duration,
        unmatched: Vec<String>,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Object coordinates and polling settings of a wait.
#[derive(Clone, Copy, Debug)]
pub struct WaitTarget<'a> {
    pub resource: &'a ApiResource,
    pub namespace: Option<&'a str>,
    pub name: &'a str,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitTarget<'_> {
    fn display(&self) -> String {
        format!("{} {}", self.resource.kind, display_name(self.namespace, self.name))
    }
}

struct CompiledRule<'a> {
    rule: &'a WaitRule,
    path: FieldPath,
}

impl CompiledRule<'_> {
    /// `None` when the rule holds, otherwise a description of the mismatch.
    fn mismatch(&self, object: &serde_json::Value) -> Option<String> {
        match self.path.evaluate_string(object) {
            Some(actual) if actual == self.rule.value => None,
            Some(actual) => Some(format!(
                "{} is \"{actual}\", expected \"{}\"",
                self.rule.jsonpath, self.rule.value
            )),
            None => Some(format!(
                "{} is not set, expected \"{}\"",
                self.rule.jsonpath, self.rule.value
            )),
        }
    }
}

/// Check that every rule parses.
///
/// # Errors
///
/// Returns [`WaitError::InvalidRule`] for the first rule that does not parse.
pub fn validate_rules(rules: &[WaitRule]) -> Result<(), WaitError> {
    compile(rules).map(|_| ())
}

fn compile(rules: &[WaitRule]) -> Result<Vec<CompiledRule<'_>>, WaitError> {
    rules
        .iter()
        .map(|rule| {
            FieldPath::parse(&rule.jsonpath)
                .map(|path| CompiledRule { rule, path })
                .map_err(|source| WaitError::InvalidRule {
                    jsonpath: rule.jsonpath.clone(),
                    source,
                })
        })
        .collect()
}

/// Poll the object until every rule holds, returning the last object read.
///
/// Transient client errors are logged and polling continues; other errors, a
/// missing object included, end the wait.
///
/// # Errors
///
/// Returns an error if a rule is invalid, a non-transient client error occurs,
/// or the rules still do not hold when the timeout expires.
pub async fn wait_for_upsert(
    client: &dyn ObjectClient,
    target: WaitTarget<'_>,
    rules: &[WaitRule],
) -> Result<DynamicObject, WaitError> {
    let compiled = compile(rules)?;
    let deadline = Instant::now() + target.timeout;
    let mut unmatched = Vec::new();

    loop {
        match client.get(target.resource, target.namespace, target.name).await {
            Ok(object) => {
                let value = serde_json::to_value(&object).map_err(ClientError::from)?;
                unmatched = compiled.iter().filter_map(|r| r.mismatch(&value)).collect();
                if unmatched.is_empty() {
                    debug!(object = %target.display(), "Wait conditions met");
                    return Ok(object);
                }
                debug!(object = %target.display(), unmatched = ?unmatched, "Waiting for conditions");
            }
            Err(e) if e.is_retryable() => {
                warn!(object = %target.display(), error = %e, "Transient error while waiting, will retry");
            }
            Err(e) => return Err(e.into()),
        }

        if Instant::now() + target.poll_interval > deadline {
            return Err(WaitError::Timeout {
                name: target.display(),
                timeout: target.timeout,
                unmatched,
            });
        }
        tokio::time::sleep(target.poll_interval).await;
    }
}

/// Poll the object until it is gone.
///
/// # Errors
///
/// Returns an error if a non-transient client error occurs or the object still
/// exists when the timeout expires.
pub async fn wait_for_delete(client: &dyn ObjectClient, target: WaitTarget<'_>) -> Result<(), WaitError> {
    let deadline = Instant::now() + target.timeout;

    loop {
        match client.get(target.resource, target.namespace, target.name).await {
            Err(e) if e.is_not_found() => {
                debug!(object = %target.display(), "Object deleted");
                return Ok(());
            }
            Err(e) if e.is_retryable() => {
                warn!(object = %target.display(), error = %e, "Transient error while waiting, will retry");
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {
                debug!(object = %target.display(), "Waiting for deletion");
            }
        }

        if Instant::now() + target.poll_interval > deadline {
            return Err(WaitError::Timeout {
                name: target.display(),
                timeout: target.timeout,
                unmatched: vec!["object still exists".to_string()],
            });
        }
        tokio::time::sleep(target.poll_interval).await;
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod wait_tests;
