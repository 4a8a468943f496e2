// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `crd.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
        JSONSchemaProps, JSONSchemaPropsOrArray,
    };
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;

    fn spec_properties<K: CustomResourceExt>() -> Vec<String> {
        let crd = K::crd();
        let schema = crd.spec.versions[0]
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .expect("generated CRD has a schema");
        let spec = schema
            .properties
            .as_ref()
            .and_then(|p| p.get("spec"))
            .expect("schema has a spec property");
        spec.properties
            .as_ref()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_cluster_deployment_api_resource() {
        assert_eq!(ClusterDeployment::group(&()), "hive.openshift.io");
        assert_eq!(ClusterDeployment::version(&()), "v1");
        assert_eq!(ClusterDeployment::kind(&()), "ClusterDeployment");
        assert_eq!(ClusterDeployment::plural(&()), "clusterdeployments");
        assert_eq!(ClusterDeployment::crd().spec.scope, "Namespaced");
    }

    #[test]
    fn test_cluster_scoped_kinds() {
        assert_eq!(ClusterImageSet::crd().spec.scope, "Cluster");
        assert_eq!(HiveConfig::crd().spec.scope, "Cluster");
        assert_eq!(SelectorSyncSet::crd().spec.scope, "Cluster");
        assert_eq!(ClusterRelocate::crd().spec.scope, "Cluster");
        assert_eq!(SyncSet::crd().spec.scope, "Namespaced");
    }

    #[test]
    fn test_dnszone_plural() {
        assert_eq!(DNSZone::plural(&()), "dnszones");
    }

    #[test]
    fn test_cluster_deployment_schema_uses_json_names() {
        let props = spec_properties::<ClusterDeployment>();
        assert!(props.contains(&"clusterName".to_string()));
        assert!(props.contains(&"manageDNS".to_string()));
        assert!(props.contains(&"pullSecretRef".to_string()));
        assert!(!props.contains(&"cluster_name".to_string()));
    }

    #[test]
    fn test_sync_set_schema_flattens_common_fields() {
        let props = spec_properties::<SyncSet>();
        assert!(props.contains(&"clusterDeploymentRefs".to_string()));
        assert!(props.contains(&"resources".to_string()));
        assert!(props.contains(&"resourceApplyMode".to_string()));
        assert!(!props.contains(&"common".to_string()));
    }

    #[test]
    fn test_cluster_deployment_spec_serialization() {
        let spec = ClusterDeploymentSpec {
            cluster_name: "mycluster".into(),
            base_domain: "example.com".into(),
            platform: Platform {
                aws: Some(AwsPlatform {
                    region: "us-east-1".into(),
                    credentials_secret_ref: Some(LocalObjectReference::new("aws-creds")),
                    user_tags: None,
                    private_link: None,
                }),
                azure: None,
                gcp: None,
            },
            manage_dns: Some(true),
            cluster_metadata: Some(ClusterMetadata {
                cluster_id: "abc".into(),
                infra_id: "mycluster-x1y2".into(),
                admin_kubeconfig_secret_ref: LocalObjectReference::new("kubeconfig"),
                admin_password_secret_ref: None,
            }),
            power_state: Some(ClusterPowerState::Hibernating),
            ..Default::default()
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["clusterName"], "mycluster");
        assert_eq!(value["manageDNS"], true);
        assert_eq!(value["clusterMetadata"]["clusterID"], "abc");
        assert_eq!(value["clusterMetadata"]["infraID"], "mycluster-x1y2");
        assert_eq!(value["powerState"], "Hibernating");
        assert_eq!(value["platform"]["aws"]["credentialsSecretRef"]["name"], "aws-creds");
        assert!(value.get("provisioning").is_none());
        assert_eq!(value["installed"], false);
    }

    #[test]
    fn test_machine_pool_type_fields_renamed() {
        let json = json!({
            "clusterDeploymentRef": {"name": "mycluster"},
            "name": "worker",
            "replicas": 3,
            "platform": {
                "aws": {
                    "type": "m5.xlarge",
                    "rootVolume": {"size": 120, "type": "gp3"}
                }
            },
            "taints": [{"key": "dedicated", "effect": "NoSchedule"}]
        });

        let spec: MachinePoolSpec = serde_json::from_value(json).unwrap();
        let aws = spec.platform.aws.unwrap();
        assert_eq!(aws.instance_type, "m5.xlarge");
        assert_eq!(aws.root_volume.volume_type, "gp3");
        assert_eq!(spec.replicas, Some(3));
        assert_eq!(spec.taints.unwrap()[0].effect, TaintEffect::NoSchedule);
    }

    #[test]
    fn test_sync_set_resources_preserved() {
        let json = json!({
            "clusterDeploymentRefs": [{"name": "mycluster"}],
            "resourceApplyMode": "Sync",
            "resources": [{
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {"name": "cm"},
                "data": {"foo": "bar"}
            }]
        });

        let spec: SyncSetSpec = serde_json::from_value(json).unwrap();
        assert_eq!(spec.common.resource_apply_mode, Some(ResourceApplyMode::Sync));
        let resources = spec.common.resources.unwrap();
        assert_eq!(resources[0]["data"]["foo"], "bar");
        assert_eq!(spec.cluster_deployment_refs[0].name, "mycluster");
    }

    fn spec_schema<K: CustomResourceExt>() -> JSONSchemaProps {
        K::crd().spec.versions[0]
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .and_then(|s| s.properties.as_ref())
            .and_then(|p| p.get("spec"))
            .cloned()
            .expect("generated CRD has a spec schema")
    }

    fn item_schema(props: &JSONSchemaProps) -> &JSONSchemaProps {
        match props.items.as_ref() {
            Some(JSONSchemaPropsOrArray::Schema(items)) => items,
            other => panic!("expected a single item schema, got {other:?}"),
        }
    }

    #[test]
    fn test_opaque_and_string_embedded_values() {
        let sync_set = spec_schema::<SyncSet>();
        let resources = &sync_set.properties.as_ref().unwrap()["resources"];
        assert_eq!(resources.type_.as_deref(), Some("array"));
        assert_eq!(item_schema(resources).x_kubernetes_preserve_unknown_fields, Some(true));

        let customization = spec_schema::<ClusterDeploymentCustomization>();
        let patches = &customization.properties.as_ref().unwrap()["installConfigPatches"];
        let value = &item_schema(patches).properties.as_ref().unwrap()["value"];
        assert_eq!(value.type_.as_deref(), Some("string"));
        assert_eq!(value.x_kubernetes_preserve_unknown_fields, None);
    }

    #[test]
    fn test_delete_protection_lowercase() {
        let spec = HiveConfigSpec {
            delete_protection: Some(DeleteProtectionType::Enabled),
            ..Default::default()
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["deleteProtection"], "enabled");
    }

    #[test]
    fn test_selector_sync_set_default_selector() {
        let spec: SelectorSyncSetSpec = serde_json::from_value(json!({})).unwrap();
        assert!(spec.cluster_deployment_selector.match_labels.is_none());
        assert!(spec.common.resources.is_none());
    }

    #[test]
    fn test_hive_crds() {
        let crds = hive_crds();
        assert_eq!(crds.len(), 14);
        assert!(crds.iter().all(|c| c.spec.group == "hive.openshift.io"));
        assert_eq!(crds[0].spec.names.kind, "Checkpoint");
        let image_set = crds
            .iter()
            .find(|c| c.spec.names.kind == "ClusterImageSet")
            .unwrap();
        assert_eq!(image_set.spec.scope, "Cluster");
    }
}
