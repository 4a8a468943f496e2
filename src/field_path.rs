// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! JSONPath-like field expressions for `wait_for_upsert` rules.
//!
//! Supported syntax, with or without the surrounding `{}`:
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `.status.installed` | object member |
//! | `.status.conditions[0]` | list element |
//! | `.status.conditions[?(@.type=="Ready")]` | first list element whose member equals a value |
//! | `.metadata.labels['hive.openshift.io/version']` | member with dots in its name |
//!
//! Results are rendered as strings so they can be compared with the configured
//! value: strings as-is, other JSON values in their JSON form (`true`, `3`).

use serde_json::Value;
use thiserror::Error;

/// Errors parsing a field expression.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("field path is empty")]
    Empty,

    #[error("invalid field path '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Filter { field: String, value: String },
}

/// A parsed field expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns an error for empty expressions, unterminated brackets, bad indices
    /// and unsupported filters.
    pub fn parse(expression: &str) -> Result<Self, FieldPathError> {
        let trimmed = expression.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(trimmed)
            .trim();
        let body = inner.strip_prefix('$').unwrap_or(inner);
        if body.is_empty() || body == "." {
            return Err(FieldPathError::Empty);
        }

        let invalid = |reason: &str| FieldPathError::Invalid {
            path: expression.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = body;
        while !rest.is_empty() {
            if let Some(after_dot) = rest.strip_prefix('.') {
                let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
                let name = &after_dot[..end];
                if name.is_empty() {
                    return Err(invalid("empty field name"));
                }
                segments.push(Segment::Field(name.to_string()));
                rest = &after_dot[end..];
            } else if let Some(after_bracket) = rest.strip_prefix('[') {
                let end = closing_bracket(after_bracket).ok_or_else(|| invalid("unterminated '['"))?;
                segments.push(parse_bracket(&after_bracket[..end]).map_err(|r| invalid(&r))?);
                rest = &after_bracket[end + 1..];
            } else if segments.is_empty() {
                // A leading field without a dot: `status.installed`
                let end = rest.find(['.', '[']).unwrap_or(rest.len());
                segments.push(Segment::Field(rest[..end].to_string()));
                rest = &rest[end..];
            } else {
                return Err(invalid("expected '.' or '['"));
            }
        }

        Ok(Self { segments })
    }

    /// Resolve the expression against an object.
    #[must_use]
    pub fn evaluate<'a>(&self, object: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(object, |current, segment| match segment {
                Segment::Field(name) => current.get(name),
                Segment::Index(index) => current.get(index),
                Segment::Filter { field, value } => current
                    .as_array()?
                    .iter()
                    .find(|item| item.get(field).map(render).as_deref() == Some(value.as_str())),
            })
    }

    /// Resolve the expression and render the result as a string.
    #[must_use]
    pub fn evaluate_string(&self, object: &Value) -> Option<String> {
        self.evaluate(object).map(render)
    }
}

/// Offset of the `]` closing a bracket, skipping brackets inside quotes.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
}

fn parse_bracket(content: &str) -> Result<Segment, String> {
    let content = content.trim();

    if let Some(filter) = content.strip_prefix('?') {
        let expr = filter
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or("filters must be written as [?(@.field==\"value\")]")?;
        let (lhs, rhs) = expr
            .split_once("==")
            .ok_or("only '==' filters are supported")?;
        let field = lhs
            .trim()
            .strip_prefix("@.")
            .filter(|f| !f.is_empty())
            .ok_or("filters must compare a member of '@'")?;
        let value = unquote(rhs).map_or_else(|| rhs.trim().to_string(), str::to_string);
        return Ok(Segment::Filter {
            field: field.to_string(),
            value,
        });
    }

    if let Some(name) = unquote(content) {
        return Ok(Segment::Field(name.to_string()));
    }

    content
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| format!("'{content}' is not a list index"))
}

/// Render a JSON value for comparison with a configured string.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "field_path_tests.rs"]
mod field_path_tests;
