// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `resource.rs`

#[cfg(test)]
mod tests {
    use super::super::{CustomResourceHandler, ResourceHandler};
    use crate::client::{ApplyParams, ObjectClient};
    use crate::context::Context;
    use crate::crd::{ClusterDeployment, ClusterImageSet};
    use crate::diagnostics::{SUMMARY_DELETE, SUMMARY_PATCH, SUMMARY_WAIT};
    use crate::memory::{InMemoryObjectClient, Operation};
    use crate::retry::ExponentialBackoff;
    use kube::core::{ApiResource, DynamicObject};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn cd() -> ApiResource {
        ApiResource::erase::<ClusterDeployment>(&())
    }

    fn fast_backoff() -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(1),
            Duration::from_millis(5),
            Some(Duration::from_millis(200)),
            2.0,
            0.0,
        )
    }

    fn context(client: &Arc<InMemoryObjectClient>) -> Context {
        let client: Arc<dyn ObjectClient> = client.clone();
        Context::new(client)
            .with_poll_interval(Duration::from_millis(5))
            .with_backoff(fast_backoff())
    }

    fn cluster_plan() -> Value {
        json!({
            "metadata": {
                "name": "mycluster",
                "namespace": "clusters",
                "labels": {"team": "platform"}
            },
            "spec": {
                "cluster_name": "mycluster",
                "base_domain": "example.com",
                "platform": {
                    "aws": {
                        "region": "us-east-1",
                        "credentials_secret_ref": {"name": "aws-creds"}
                    }
                },
                "manage_dns": true
            }
        })
    }

    #[tokio::test]
    async fn test_create_applies_and_records_state() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let response = handler.create(&ctx, &cluster_plan()).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

        let state = response.state.unwrap();
        assert_eq!(state["id"], "clusters/mycluster");
        assert_eq!(state["api_version"], "hive.openshift.io/v1");
        assert_eq!(state["kind"], "ClusterDeployment");
        assert_eq!(state["field_manager"], "terraform-provider-hive");
        assert_eq!(state["force_conflicts"], false);
        assert_eq!(state["metadata"]["labels"], json!({"team": "platform"}));
        assert_eq!(state["metadata"]["generation"], 1);
        assert!(state["metadata"]["uid"].is_string());
        assert_eq!(state["spec"]["platform"]["aws"]["region"], "us-east-1");
        assert_eq!(state["spec"]["manage_dns"], true);

        let stored = client.get(&cd(), Some("clusters"), "mycluster").await.unwrap();
        assert_eq!(stored.data["spec"]["clusterName"], "mycluster");
        assert_eq!(stored.data["spec"]["manageDNS"], true);
        assert_eq!(
            stored.data["spec"]["platform"]["aws"]["credentialsSecretRef"]["name"],
            "aws-creds"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_plan_without_calling_the_api() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let mut plan = cluster_plan();
        plan["metadata"]["name"] = json!("Not_A_Name");
        plan["spec"]["base_domain"] = Value::Null;

        let response = handler.create(&ctx, &plan).await;
        assert!(response.state.is_none());
        let paths: Vec<_> = response
            .diagnostics
            .iter()
            .filter_map(|d| d.attribute.clone())
            .collect();
        assert!(paths.contains(&"metadata.name".to_string()));
        assert!(paths.contains(&"spec.base_domain".to_string()));
        assert_eq!(client.calls(Operation::Apply).await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_wait_rule() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let mut plan = cluster_plan();
        plan["wait_for_upsert"] = json!([{"jsonpath": "{.status[", "value": "x"}]);

        let response = handler.create(&ctx, &plan).await;
        assert!(response.diagnostics.has_error());
        assert_eq!(
            response.diagnostics.iter().next().unwrap().attribute.as_deref(),
            Some("wait_for_upsert")
        );
        assert_eq!(client.calls(Operation::Apply).await, 0);
    }

    #[tokio::test]
    async fn test_create_waits_for_status() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let writer = Arc::clone(&client);
        let updater = tokio::spawn(async move {
            for _ in 0..100 {
                if writer
                    .set_status(&cd(), Some("clusters"), "mycluster", json!({"installed": true}))
                    .await
                    .is_ok()
                {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let mut plan = cluster_plan();
        plan["wait_for_upsert"] = json!([{"jsonpath": "{.status.installed}", "value": "true"}]);
        plan["timeouts"] = json!({"create": "5s"});

        let response = handler.create(&ctx, &plan).await;
        updater.await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

        let state = response.state.unwrap();
        assert_eq!(state["wait_for_upsert"][0]["value"], "true");
        assert_eq!(state["timeouts"]["create"], "5s");
    }

    #[tokio::test]
    async fn test_create_wait_timeout_keeps_state() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let mut plan = cluster_plan();
        plan["wait_for_upsert"] = json!([{"jsonpath": "{.status.installed}", "value": "true"}]);
        plan["timeouts"] = json!({"create": "30ms"});

        let response = handler.create(&ctx, &plan).await;
        assert!(response.state.is_some());
        let diag = response.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, SUMMARY_WAIT);
        assert!(diag.detail.contains("{.status.installed}"));
    }

    #[tokio::test]
    async fn test_create_conflict_mentions_force_conflicts() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let mut other = cluster_plan();
        other["field_manager"] = json!("kubectl");
        other["spec"]["base_domain"] = json!("other.example.com");
        assert!(!handler.create(&ctx, &other).await.diagnostics.has_error());

        let response = handler.create(&ctx, &cluster_plan()).await;
        let diag = response.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, SUMMARY_PATCH);
        assert!(diag.detail.contains("force_conflicts"));
        assert!(response.state.is_none());

        let mut forced = cluster_plan();
        forced["force_conflicts"] = json!(true);
        let response = handler.create(&ctx, &forced).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(response.state.unwrap()["spec"]["base_domain"], "example.com");
    }

    #[tokio::test]
    async fn test_transient_apply_errors_are_retried() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();
        client.inject_error(Operation::Apply, 503, "unavailable", 2).await;

        let response = handler.create(&ctx, &cluster_plan()).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(client.calls(Operation::Apply).await, 3);
    }

    #[tokio::test]
    async fn test_read_refreshes_and_removes_missing_objects() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let state = handler.create(&ctx, &cluster_plan()).await.state.unwrap();
        client
            .set_status(&cd(), Some("clusters"), "mycluster", json!({"installed": true}))
            .await
            .unwrap();

        let refreshed = handler.read(&ctx, &state).await;
        assert!(refreshed.diagnostics.is_empty());
        let refreshed = refreshed.state.unwrap();
        assert_eq!(refreshed["spec"], state["spec"]);
        assert_ne!(
            refreshed["metadata"]["resource_version"],
            state["metadata"]["resource_version"]
        );

        client.delete(&cd(), Some("clusters"), "mycluster").await.unwrap();
        let gone = handler.read(&ctx, &state).await;
        assert!(gone.state.is_none());
        assert!(gone.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_read_error_keeps_prior_state() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let state = handler.create(&ctx, &cluster_plan()).await.state.unwrap();
        client.inject_error(Operation::Get, 403, "forbidden", 1).await;

        let response = handler.read(&ctx, &state).await;
        assert_eq!(response.state.as_ref(), Some(&state));
        assert!(response.diagnostics.errors().next().unwrap().detail.contains("RBAC"));
    }

    #[tokio::test]
    async fn test_update_changes_spec() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let prior = handler.create(&ctx, &cluster_plan()).await.state.unwrap();
        let mut plan = prior.clone();
        plan["spec"]["platform"]["aws"]["region"] = json!("eu-west-1");
        plan["metadata"]["labels"] = json!({"team": "platform", "env": "prod"});

        let response = handler.update(&ctx, &plan, &prior).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state.unwrap();
        assert_eq!(state["spec"]["platform"]["aws"]["region"], "eu-west-1");
        assert_eq!(state["metadata"]["labels"]["env"], "prod");
        assert_eq!(state["metadata"]["generation"], 2);
    }

    #[tokio::test]
    async fn test_update_refuses_rename() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let prior = handler.create(&ctx, &cluster_plan()).await.state.unwrap();
        let mut plan = prior.clone();
        plan["metadata"]["name"] = json!("renamed");

        let response = handler.update(&ctx, &plan, &prior).await;
        assert_eq!(response.state.as_ref(), Some(&prior));
        let diag = response.diagnostics.errors().next().unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("metadata.name"));
        assert_eq!(client.calls(Operation::Apply).await, 1);
    }

    #[tokio::test]
    async fn test_delete_and_wait() {
        let client = Arc::new(InMemoryObjectClient::new().with_deletion_reads(2));
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let mut plan = cluster_plan();
        plan["wait_for_delete"] = json!(true);
        let state = handler.create(&ctx, &plan).await.state.unwrap();

        let response = handler.delete(&ctx, &state).await;
        assert!(response.state.is_none());
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert!(client.is_empty().await);

        // Deleting again is a no-op
        let again = handler.delete(&ctx, &state).await;
        assert!(again.state.is_none());
        assert!(again.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_state() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let state = handler.create(&ctx, &cluster_plan()).await.state.unwrap();
        client.inject_error(Operation::Delete, 403, "forbidden", 1).await;

        let response = handler.delete(&ctx, &state).await;
        assert_eq!(response.state.as_ref(), Some(&state));
        assert_eq!(response.diagnostics.errors().next().unwrap().summary, SUMMARY_DELETE);
    }

    #[tokio::test]
    async fn test_import_takes_all_server_labels() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();
        handler.create(&ctx, &cluster_plan()).await;

        let response = handler.import(&ctx, "clusters/mycluster").await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state.unwrap();
        assert_eq!(state["id"], "clusters/mycluster");
        assert_eq!(state["metadata"]["namespace"], "clusters");
        assert_eq!(state["metadata"]["labels"], json!({"team": "platform"}));
        assert_eq!(state["spec"]["cluster_name"], "mycluster");
    }

    #[tokio::test]
    async fn test_empty_metadata_maps_stay_maps() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterImageSet>::new();
        let plan = json!({
            "metadata": {"name": "openshift-v4.14.0", "labels": {}, "annotations": {}},
            "spec": {"release_image": "quay.io/openshift-release-dev/ocp-release:4.14.0-x86_64"}
        });

        let created = handler.create(&ctx, &plan).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
        let state = created.state.unwrap();
        assert_eq!(state["metadata"]["labels"], json!({}));
        assert_eq!(state["metadata"]["annotations"], json!({}));

        let refreshed = handler.read(&ctx, &state).await.state.unwrap();
        assert_eq!(refreshed["metadata"]["labels"], json!({}));
        assert_eq!(refreshed["metadata"]["annotations"], json!({}));

        let unset = json!({
            "metadata": {"name": "openshift-v4.15.0"},
            "spec": {"release_image": "quay.io/openshift-release-dev/ocp-release:4.15.0-x86_64"}
        });
        let state = handler.create(&ctx, &unset).await.state.unwrap();
        assert!(state["metadata"]["labels"].is_null());
        assert!(state["metadata"]["annotations"].is_null());
    }

    #[tokio::test]
    async fn test_configured_labels_follow_the_server() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();
        let mut state = handler.create(&ctx, &cluster_plan()).await.state.unwrap();

        // Label added by a controller
        let labelled: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "hive.openshift.io/v1",
            "kind": "ClusterDeployment",
            "metadata": {"name": "mycluster", "namespace": "clusters", "labels": {"owner": "sre"}}
        }))
        .unwrap();
        let params = ApplyParams {
            field_manager: "hive-controllers".to_string(),
            force: false,
        };
        client
            .apply(&cd(), Some("clusters"), &labelled, &params)
            .await
            .unwrap();

        // Configured key the server does not have
        state["metadata"]["labels"] = json!({"team": "platform", "cost-center": "42"});

        let refreshed = handler.read(&ctx, &state).await.state.unwrap();
        assert_eq!(refreshed["metadata"]["labels"], json!({"team": "platform"}));

        let imported = handler.import(&ctx, "clusters/mycluster").await.state.unwrap();
        assert_eq!(
            imported["metadata"]["labels"],
            json!({"owner": "sre", "team": "platform"})
        );
    }

    #[tokio::test]
    async fn test_import_errors() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client);
        let handler = CustomResourceHandler::<ClusterDeployment>::new();

        let bad_id = handler.import(&ctx, "mycluster").await;
        assert!(bad_id.diagnostics.errors().next().unwrap().detail.contains("namespace/name"));

        let missing = handler.import(&ctx, "clusters/missing").await;
        assert!(missing.state.is_none());
        assert_eq!(
            missing.diagnostics.errors().next().unwrap().summary,
            "Cannot import non-existent remote object"
        );
    }

    #[tokio::test]
    async fn test_cluster_scoped_kind() {
        let client = Arc::new(InMemoryObjectClient::new());
        let ctx = context(&client).with_field_manager("platform-team");
        let handler = CustomResourceHandler::<ClusterImageSet>::new();
        assert_eq!(handler.type_name(), "hive_cluster_image_set_v1");
        assert!(!handler.schema().attributes["metadata"]
            .attributes()
            .unwrap()
            .contains_key("namespace"));

        let plan = json!({
            "metadata": {"name": "openshift-v4.14.0"},
            "spec": {"release_image": "quay.io/openshift-release-dev/ocp-release:4.14.0-x86_64"}
        });
        let state = handler.create(&ctx, &plan).await.state.unwrap();
        assert_eq!(state["id"], "openshift-v4.14.0");
        assert_eq!(state["field_manager"], "platform-team");
        assert!(state["metadata"].get("namespace").is_none());

        let imported = handler.import(&ctx, "openshift-v4.14.0").await.state.unwrap();
        assert_eq!(imported["spec"], state["spec"]);
    }
}
