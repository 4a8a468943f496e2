// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `memory.rs`

#[cfg(test)]
mod tests {
    use super::super::{InMemoryObjectClient, Operation};
    use crate::client::{ApplyParams, ClientError, ObjectClient};
    use crate::crd::{ClusterDeployment, ClusterImageSet};
    use kube::core::{ApiResource, DynamicObject};
    use serde_json::json;

    fn cd() -> ApiResource {
        ApiResource::erase::<ClusterDeployment>(&())
    }

    fn params(manager: &str, force: bool) -> ApplyParams {
        ApplyParams {
            field_manager: manager.to_string(),
            force,
        }
    }

    fn object(spec: serde_json::Value) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "hive.openshift.io/v1",
            "kind": "ClusterDeployment",
            "metadata": {"name": "mycluster", "namespace": "clusters", "labels": {"team": "a"}},
            "spec": spec
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_apply_creates_object_with_server_fields() {
        let client = InMemoryObjectClient::new();
        let created = client
            .apply(&cd(), Some("clusters"), &object(json!({"clusterName": "c"})), &params("tf", false))
            .await
            .unwrap();

        assert!(created.metadata.uid.is_some());
        assert_eq!(created.metadata.generation, Some(1));
        assert!(created.metadata.resource_version.is_some());
        assert!(created.metadata.creation_timestamp.is_some());
        assert_eq!(created.metadata.namespace.as_deref(), Some("clusters"));
        assert_eq!(
            created.metadata.labels.unwrap().get("team").map(String::as_str),
            Some("a")
        );
        assert_eq!(created.data["spec"]["clusterName"], "c");
        assert_eq!(client.len().await, 1);

        let read = client.get(&cd(), Some("clusters"), "mycluster").await.unwrap();
        assert_eq!(read.metadata.uid, created.metadata.uid);
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let client = InMemoryObjectClient::new();
        let err = client.get(&cd(), Some("clusters"), "nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "ClusterDeployment clusters/nope not found");
    }

    #[tokio::test]
    async fn test_namespaces_and_kinds_are_separate() {
        let client = InMemoryObjectClient::new();
        client
            .apply(&cd(), Some("clusters"), &object(json!({})), &params("tf", false))
            .await
            .unwrap();

        assert!(client.get(&cd(), Some("other"), "mycluster").await.is_err());
        let image_sets = ApiResource::erase::<ClusterImageSet>(&());
        assert!(client.get(&image_sets, None, "mycluster").await.is_err());
    }

    #[tokio::test]
    async fn test_reapply_bumps_generation_only_on_spec_change() {
        let client = InMemoryObjectClient::new();
        let first = client
            .apply(&cd(), Some("clusters"), &object(json!({"clusterName": "c"})), &params("tf", false))
            .await
            .unwrap();
        let same = client
            .apply(&cd(), Some("clusters"), &object(json!({"clusterName": "c"})), &params("tf", false))
            .await
            .unwrap();
        assert_eq!(same.metadata.generation, Some(1));
        assert_ne!(same.metadata.resource_version, first.metadata.resource_version);

        let changed = client
            .apply(&cd(), Some("clusters"), &object(json!({"clusterName": "d"})), &params("tf", false))
            .await
            .unwrap();
        assert_eq!(changed.metadata.generation, Some(2));
        assert_eq!(changed.metadata.uid, first.metadata.uid);
    }

    #[tokio::test]
    async fn test_fields_dropped_by_manager_are_removed() {
        let client = InMemoryObjectClient::new();
        client
            .apply(
                &cd(),
                Some("clusters"),
                &object(json!({"clusterName": "c", "installed": true})),
                &params("tf", false),
            )
            .await
            .unwrap();

        let updated = client
            .apply(&cd(), Some("clusters"), &object(json!({"clusterName": "c"})), &params("tf", false))
            .await
            .unwrap();
        assert!(updated.data["spec"].get("installed").is_none());
    }

    #[tokio::test]
    async fn test_conflict_with_other_manager() {
        let client = InMemoryObjectClient::new();
        client
            .apply(&cd(), Some("clusters"), &object(json!({"installed": false})), &params("kubectl", false))
            .await
            .unwrap();

        let err = client
            .apply(&cd(), Some("clusters"), &object(json!({"installed": true})), &params("tf", false))
            .await
            .unwrap_err();
        let ClientError::Conflict(message) = &err else {
            panic!("expected a conflict, got {err:?}");
        };
        assert!(message.contains("conflict with \"kubectl\": .spec.installed"));
    }

    #[tokio::test]
    async fn test_same_value_is_shared_not_conflicting() {
        let client = InMemoryObjectClient::new();
        client
            .apply(&cd(), Some("clusters"), &object(json!({"installed": true})), &params("kubectl", false))
            .await
            .unwrap();
        client
            .apply(&cd(), Some("clusters"), &object(json!({"installed": true})), &params("tf", false))
            .await
            .unwrap();

        let managers = client.managed_fields(&cd(), Some("clusters"), "mycluster").await;
        assert_eq!(
            managers[".spec.installed"],
            vec!["kubectl".to_string(), "tf".to_string()]
        );
    }

    #[tokio::test]
    async fn test_force_takes_ownership() {
        let client = InMemoryObjectClient::new();
        client
            .apply(&cd(), Some("clusters"), &object(json!({"installed": false})), &params("kubectl", false))
            .await
            .unwrap();

        let forced = client
            .apply(&cd(), Some("clusters"), &object(json!({"installed": true})), &params("tf", true))
            .await
            .unwrap();
        assert_eq!(forced.data["spec"]["installed"], true);

        let managers = client.managed_fields(&cd(), Some("clusters"), "mycluster").await;
        assert_eq!(managers[".spec.installed"], vec!["tf".to_string()]);
        assert_eq!(
            managers[".metadata.labels.team"],
            vec!["kubectl".to_string(), "tf".to_string()]
        );
    }

    #[tokio::test]
    async fn test_status_is_not_applied() {
        let client = InMemoryObjectClient::new();
        let mut obj = object(json!({}));
        obj.data["status"] = json!({"installed": true});
        let created = client
            .apply(&cd(), Some("clusters"), &obj, &params("tf", false))
            .await
            .unwrap();
        assert!(created.data.get("status").is_none());

        client
            .set_status(&cd(), Some("clusters"), "mycluster", json!({"powerState": "Running"}))
            .await
            .unwrap();
        let read = client.get(&cd(), Some("clusters"), "mycluster").await.unwrap();
        assert_eq!(read.data["status"]["powerState"], "Running");

        let reapplied = client
            .apply(&cd(), Some("clusters"), &object(json!({})), &params("tf", false))
            .await
            .unwrap();
        assert_eq!(reapplied.data["status"]["powerState"], "Running");
    }

    #[tokio::test]
    async fn test_set_status_on_missing_object() {
        let client = InMemoryObjectClient::new();
        let err = client
            .set_status(&cd(), Some("clusters"), "nope", json!({}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_apply_rejects_namespace_mismatch() {
        let client = InMemoryObjectClient::new();
        let err = client
            .apply(&cd(), Some("other"), &object(json!({})), &params("tf", false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(400));
    }

    #[tokio::test]
    async fn test_delete_immediately() {
        let client = InMemoryObjectClient::new();
        client
            .apply(&cd(), Some("clusters"), &object(json!({})), &params("tf", false))
            .await
            .unwrap();

        client.delete(&cd(), Some("clusters"), "mycluster").await.unwrap();
        assert!(client.is_empty().await);
        assert!(client
            .delete(&cd(), Some("clusters"), "mycluster")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_delete_with_grace_reads() {
        let client = InMemoryObjectClient::new().with_deletion_reads(2);
        client
            .apply(&cd(), Some("clusters"), &object(json!({})), &params("tf", false))
            .await
            .unwrap();
        client.delete(&cd(), Some("clusters"), "mycluster").await.unwrap();

        for _ in 0..2 {
            let read = client.get(&cd(), Some("clusters"), "mycluster").await.unwrap();
            assert!(read.metadata.deletion_timestamp.is_some());
        }
        assert!(client
            .get(&cd(), Some("clusters"), "mycluster")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(client.is_empty().await);
    }

    #[tokio::test]
    async fn test_injected_errors() {
        let client = InMemoryObjectClient::new();
        client.inject_error(Operation::Apply, 503, "etcd unavailable", 2).await;

        for _ in 0..2 {
            let err = client
                .apply(&cd(), Some("clusters"), &object(json!({})), &params("tf", false))
                .await
                .unwrap_err();
            assert_eq!(err.code(), Some(503));
        }
        client
            .apply(&cd(), Some("clusters"), &object(json!({})), &params("tf", false))
            .await
            .unwrap();

        assert_eq!(client.calls(Operation::Apply).await, 3);
        assert_eq!(client.calls(Operation::Get).await, 0);

        client.inject_error(Operation::Get, 403, "forbidden", 1).await;
        let err = client.get(&cd(), Some("clusters"), "mycluster").await.unwrap_err();
        assert_eq!(err.code(), Some(403));
        assert!(client.get(&cd(), Some("clusters"), "mycluster").await.is_ok());
    }
}
