// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Diagnostics returned to the plugin host.
//!
//! Operations never fail with a Rust error: every problem, from an invalid
//! attribute to an unreachable API server, is reported as a [`Diagnostic`] so the
//! host can show it next to the offending configuration.
//!
//! # HTTP Code Mapping
//!
//! | HTTP Code | Hint |
//! |-----------|------|
//! | 401 | Credentials rejected |
//! | 403 | Missing RBAC permissions |
//! | 404 | Object or CRD not found |
//! | 409 | Field manager conflict, set `force_conflicts` |
//! | 422 | Object rejected by validation |
//! | 429 | Rate limited |
//! | 5xx | API server error |

use crate::client::ClientError;
use serde::{Deserialize, Serialize};

/// Summary of diagnostics raised by a failed GET
pub const SUMMARY_GET: &str = "Unable to GET resource";

/// Summary of diagnostics raised by a failed server-side apply
pub const SUMMARY_PATCH: &str = "Unable to PATCH resource";

/// Summary of diagnostics raised by a failed DELETE
pub const SUMMARY_DELETE: &str = "Unable to DELETE resource";

/// Summary of diagnostics raised when state cannot be turned into an object
pub const SUMMARY_MARSHAL: &str = "Unable to marshal resource";

/// Summary of diagnostics raised when a response cannot be turned into state
pub const SUMMARY_UNMARSHAL: &str = "Unable to unmarshal resource";

/// Summary of diagnostics raised when a wait condition is not met in time
pub const SUMMARY_WAIT: &str = "Unable to wait for resource";

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single problem reported to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Dotted attribute path the diagnostic refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary, detail)
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, path: impl Into<String>) -> Self {
        self.attribute = Some(path.into());
        self
    }
}

/// Ordered collection of diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    pub fn attribute_error(
        &mut self,
        path: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::error(summary, detail).with_attribute(path));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Hint appended to client error details for a given HTTP status code.
#[must_use]
pub fn hint_for_status(code: u16) -> Option<&'static str> {
    match code {
        401 => Some("The API server rejected the credentials of the configured kubeconfig."),
        403 => Some("The configured user lacks RBAC permissions for this resource."),
        404 => Some("The object or its CustomResourceDefinition does not exist. Is Hive installed?"),
        409 => Some(
            "Fields of the object are managed by another field manager. Set 'force_conflicts = true' to take ownership.",
        ),
        422 => Some("The object was rejected by the API server's validation."),
        429 => Some("The API server is rate limiting requests."),
        500..=599 => Some("The API server reported an internal error."),
        _ => None,
    }
}

/// Turn a client error into an error diagnostic with the given summary.
#[must_use]
pub fn client_error_diagnostic(summary: &str, err: &ClientError) -> Diagnostic {
    let detail = match err.code().and_then(hint_for_status) {
        Some(hint) => format!("{err}\n\n{hint}"),
        None => err.to_string(),
    };
    Diagnostic::error(summary, detail)
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod diagnostics_tests;
