// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `field_path.rs`

#[cfg(test)]
mod tests {
    use super::super::{render, FieldPath, FieldPathError};
    use serde_json::json;

    fn cluster_deployment() -> serde_json::Value {
        json!({
            "metadata": {
                "name": "mycluster",
                "labels": {"hive.openshift.io/version-major-minor": "4.14"}
            },
            "spec": {"installed": true, "installAttemptsLimit": 3},
            "status": {
                "powerState": "Running",
                "conditions": [
                    {"type": "ProvisionFailed", "status": "False"},
                    {"type": "Ready", "status": "True", "reason": "ClusterReady"}
                ]
            }
        })
    }

    fn eval(expression: &str) -> Option<String> {
        FieldPath::parse(expression)
            .unwrap()
            .evaluate_string(&cluster_deployment())
    }

    #[test]
    fn test_members() {
        assert_eq!(eval("{.status.powerState}").as_deref(), Some("Running"));
        assert_eq!(eval(".status.powerState").as_deref(), Some("Running"));
        assert_eq!(eval("status.powerState").as_deref(), Some("Running"));
        assert_eq!(eval("{$.metadata.name}").as_deref(), Some("mycluster"));
    }

    #[test]
    fn test_non_string_values_are_rendered_as_json() {
        assert_eq!(eval("{.spec.installed}").as_deref(), Some("true"));
        assert_eq!(eval("{.spec.installAttemptsLimit}").as_deref(), Some("3"));
    }

    #[test]
    fn test_index() {
        assert_eq!(
            eval("{.status.conditions[1].type}").as_deref(),
            Some("Ready")
        );
        assert_eq!(eval("{.status.conditions[5].type}"), None);
    }

    #[test]
    fn test_filter() {
        assert_eq!(
            eval(r#"{.status.conditions[?(@.type=="Ready")].status}"#).as_deref(),
            Some("True")
        );
        assert_eq!(
            eval("{.status.conditions[?(@.type=='ProvisionFailed')].status}").as_deref(),
            Some("False")
        );
        assert_eq!(
            eval(r#"{.status.conditions[?(@.type=="Hibernating")].status}"#),
            None
        );
    }

    #[test]
    fn test_quoted_member() {
        assert_eq!(
            eval("{.metadata.labels['hive.openshift.io/version-major-minor']}").as_deref(),
            Some("4.14")
        );
    }

    #[test]
    fn test_missing_member() {
        assert_eq!(eval("{.status.installedTimestamp}"), None);
        assert_eq!(eval("{.spec.installed.nested}"), None);
    }

    #[test]
    fn test_whole_object_rendering() {
        let rendered = render(&json!({"a": 1}));
        assert_eq!(rendered, r#"{"a":1}"#);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(FieldPath::parse("").unwrap_err(), FieldPathError::Empty);
        assert_eq!(FieldPath::parse("{}").unwrap_err(), FieldPathError::Empty);
        assert!(FieldPath::parse("{.status..x}").is_err());
        assert!(FieldPath::parse("{.status.conditions[0}").is_err());
        assert!(FieldPath::parse("{.status.conditions[x]}").is_err());
        assert!(FieldPath::parse("{.status.conditions[?(@.type!=\"Ready\")]}").is_err());
        assert!(FieldPath::parse("{.status.conditions[0]x}").is_err());
    }
}
