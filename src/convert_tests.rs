// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `convert.rs`

#[cfg(test)]
mod tests {
    use super::super::{from_kubernetes, prune_nulls, to_kubernetes};
    use crate::crd::ClusterDeployment;
    use crate::kind::KindInfo;
    use crate::schema::{Attribute, AttributeKind, ValueType};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn cluster_deployment_spec() -> BTreeMap<String, Attribute> {
        KindInfo::of::<ClusterDeployment>()
            .spec_attributes()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_to_kubernetes_renames_nested_fields() {
        let spec = cluster_deployment_spec();
        let state = json!({
            "cluster_name": "mycluster",
            "base_domain": "example.com",
            "manage_dns": true,
            "platform": {
                "aws": {
                    "region": "us-east-1",
                    "credentials_secret_ref": {"name": "aws-creds"},
                    "user_tags": {"team_name": "x"}
                },
                "gcp": null
            },
            "pull_secret_ref": {"name": "pull"},
            "cluster_metadata": null
        });

        let object = to_kubernetes(&state, &spec);
        assert_eq!(
            object,
            json!({
                "clusterName": "mycluster",
                "baseDomain": "example.com",
                "manageDNS": true,
                "platform": {
                    "aws": {
                        "region": "us-east-1",
                        "credentialsSecretRef": {"name": "aws-creds"},
                        "userTags": {"team_name": "x"}
                    }
                },
                "pullSecretRef": {"name": "pull"}
            })
        );
    }

    #[test]
    fn test_to_kubernetes_list_nested() {
        let spec = cluster_deployment_spec();
        let state = json!({
            "ingress": [
                {"name": "default", "domain": "apps.example.com", "serving_certificate": null}
            ]
        });

        let object = to_kubernetes(&state, &spec);
        assert_eq!(
            object,
            json!({"ingress": [{"name": "default", "domain": "apps.example.com"}]})
        );
    }

    #[test]
    fn test_to_kubernetes_drops_undeclared_keys() {
        let attrs = BTreeMap::from([("name".to_string(), Attribute::string("name"))]);
        let object = to_kubernetes(&json!({"name": "a", "bogus": 1}), &attrs);
        assert_eq!(object, json!({"name": "a"}));
    }

    #[test]
    fn test_dynamic_values_pass_through() {
        let attrs = BTreeMap::from([(
            "resources".to_string(),
            Attribute::new(
                "resources",
                AttributeKind::Value(ValueType::List {
                    element: Box::new(ValueType::Dynamic),
                }),
            ),
        )]);
        let raw = json!({"resources": [{"apiVersion": "v1", "kind": "ConfigMap", "data": {"some_key": null}}]});

        let object = to_kubernetes(&raw, &attrs);
        assert_eq!(object["resources"][0]["apiVersion"], "v1");
        assert!(object["resources"][0]["data"]["some_key"].is_null());

        let back = from_kubernetes(&object, &attrs);
        assert_eq!(back, raw);
    }

    #[test]
    fn test_from_kubernetes_fills_missing_attributes() {
        let spec = cluster_deployment_spec();
        let object = json!({
            "clusterName": "mycluster",
            "baseDomain": "example.com",
            "platform": {"aws": {"region": "us-east-1"}},
            "installed": false,
            "someServerDefault": "ignored"
        });

        let state = from_kubernetes(&object, &spec);
        assert_eq!(state["cluster_name"], "mycluster");
        assert_eq!(state["installed"], false);
        assert!(state["manage_dns"].is_null());
        assert!(state["provisioning"].is_null());
        assert!(state.get("someServerDefault").is_none());
        assert_eq!(state["platform"]["aws"]["region"], "us-east-1");
        assert!(state["platform"]["gcp"].is_null());
        assert!(state["platform"]["aws"]["credentials_secret_ref"].is_null());
    }

    #[test]
    fn test_from_kubernetes_stringifies_int_or_string() {
        let attrs = BTreeMap::from([("port".to_string(), Attribute::string("port"))]);
        let state = from_kubernetes(&json!({"port": 8443}), &attrs);
        assert_eq!(state["port"], "8443");
    }

    #[test]
    fn test_from_kubernetes_non_object_is_all_null() {
        let attrs = BTreeMap::from([("name".to_string(), Attribute::string("name"))]);
        assert_eq!(from_kubernetes(&json!(null), &attrs), json!({"name": null}));
    }

    #[test]
    fn test_prune_nulls() {
        let value = json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null}]});
        assert_eq!(prune_nulls(&value), json!({"b": {"d": 1}, "e": [{}]}));
    }
}
