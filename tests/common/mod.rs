// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use hive_provider::client::ObjectClient;
use hive_provider::context::Context;
use hive_provider::memory::InMemoryObjectClient;
use hive_provider::provider::Provider;
use hive_provider::retry::ExponentialBackoff;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Backoff that gives up quickly, for tests with injected errors.
pub fn fast_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(1),
        Duration::from_millis(5),
        Some(Duration::from_millis(250)),
        2.0,
        0.0,
    )
}

/// Context over `client` with fast polling and retries.
pub fn fast_context(client: Arc<dyn ObjectClient>, field_manager: &str) -> Context {
    Context::new(client)
        .with_field_manager(field_manager)
        .with_poll_interval(Duration::from_millis(5))
        .with_backoff(fast_backoff())
}

/// Provider backed by a shared in-memory client.
pub fn memory_provider(client: &Arc<InMemoryObjectClient>, field_manager: &str) -> Provider {
    let client: Arc<dyn ObjectClient> = client.clone();
    Provider::hive().with_context(fast_context(client, field_manager))
}

/// Plan of a small AWS `ClusterDeployment`.
pub fn cluster_deployment_plan(namespace: &str, name: &str) -> Value {
    json!({
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": {"hive.openshift.io/cluster-platform": "aws"}
        },
        "spec": {
            "cluster_name": name,
            "base_domain": "example.com",
            "platform": {
                "aws": {
                    "region": "us-east-1",
                    "credentials_secret_ref": {"name": format!("{name}-aws-creds")}
                }
            },
            "pull_secret_ref": {"name": format!("{name}-pull-secret")},
            "provisioning": {
                "image_set_ref": {"name": "openshift-v4.14.0"},
                "install_config_secret_ref": {"name": format!("{name}-install-config")}
            }
        }
    })
}

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Whether the Hive CRDs are installed in the cluster.
pub async fn hive_crds_installed(client: &Client) -> bool {
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    match crds.get("clusterimagesets.hive.openshift.io").await {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Skipping integration test: Hive CRDs are not installed: {e}");
            false
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(client: &Client, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "terraform-provider-hive-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
