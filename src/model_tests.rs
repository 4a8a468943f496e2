// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `model.rs`

#[cfg(test)]
mod tests {
    use super::super::{ResourceModel, Timeouts};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_resource_model_from_plan() {
        let model: ResourceModel = serde_json::from_value(json!({
            "id": null,
            "field_manager": "tf",
            "force_conflicts": null,
            "wait_for_upsert": [{"jsonpath": "{.status.installed}", "value": "true"}],
            "timeouts": {"create": "30m", "update": null, "delete": null},
            "metadata": {"name": "a", "namespace": "b", "labels": null, "uid": null},
            "spec": {"cluster_name": "a"}
        }))
        .unwrap();

        assert_eq!(model.id, None);
        assert_eq!(model.field_manager.as_deref(), Some("tf"));
        assert_eq!(model.force_conflicts, None);
        assert_eq!(model.wait_rules().len(), 1);
        assert_eq!(model.metadata.namespace.as_deref(), Some("b"));
        assert_eq!(model.timeouts().create(), Duration::from_secs(1800));
        assert_eq!(model.spec["cluster_name"], "a");
    }

    #[test]
    fn test_missing_optional_blocks() {
        let model: ResourceModel =
            serde_json::from_value(json!({"metadata": {"name": "img"}})).unwrap();
        assert!(model.wait_rules().is_empty());
        assert!(model.spec.is_null());
        assert_eq!(model.metadata.namespace, None);
    }

    #[test]
    fn test_timeout_defaults() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.create(), Duration::from_secs(600));
        assert_eq!(timeouts.update(), Duration::from_secs(600));
        assert_eq!(timeouts.delete(), Duration::from_secs(600));

        let custom = Timeouts {
            delete: Some("1h".to_string()),
            update: Some("bogus".to_string()),
            ..Timeouts::default()
        };
        assert_eq!(custom.delete(), Duration::from_secs(3600));
        assert_eq!(custom.update(), Duration::from_secs(600));
    }
}
