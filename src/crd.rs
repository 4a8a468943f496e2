// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) of the Hive operator.
//!
//! This module mirrors the `hive.openshift.io/v1` API group that Hive uses to
//! manage the lifecycle of OpenShift clusters. The types are the source of the
//! attribute schemas exposed by the provider: each kind's OpenAPI v3 schema is
//! generated with [`kube::CustomResourceExt::crd`] and translated into
//! resource and data source schemas.
//!
//! # Resource Types
//!
//! ## Cluster Lifecycle
//!
//! - [`ClusterDeployment`] - An OpenShift cluster installed or adopted by Hive
//! - [`ClusterDeprovision`] - Tears down the cloud resources of a cluster
//! - [`ClusterImageSet`] - A named OpenShift release image
//! - [`ClusterRelocate`] - Moves `ClusterDeployments` to another Hive instance
//! - [`Checkpoint`] - Backup bookkeeping for Hive state
//!
//! ## Pools
//!
//! - [`ClusterPool`] - A pool of pre-provisioned, hibernating clusters
//! - [`ClusterClaim`] - A claim on a cluster from a pool
//! - [`ClusterDeploymentCustomization`] - Install-config patches for pool clusters
//!
//! ## Workers and Configuration Sync
//!
//! - [`MachinePool`] - Worker machines of a cluster
//! - [`MachinePoolNameLease`] - Lease on a short machine pool name
//! - [`SyncSet`] - Resources and patches synced to listed clusters
//! - [`SelectorSyncSet`] - Resources and patches synced to clusters matching a selector
//!
//! ## DNS and Operator
//!
//! - [`DNSZone`] - A DNS zone managed in the cloud provider for cluster ingress
//! - [`HiveConfig`] - Cluster-wide configuration of the Hive operator
//!
//! # Example: Describing a Cluster
//!
//! ```rust,no_run
//! use hive_provider::crd::{
//!     AwsPlatform, ClusterDeploymentSpec, ClusterImageSetReference, LocalObjectReference,
//!     Platform, Provisioning,
//! };
//!
//! let spec = ClusterDeploymentSpec {
//!     cluster_name: "mycluster".to_string(),
//!     base_domain: "example.com".to_string(),
//!     platform: Platform {
//!         aws: Some(AwsPlatform {
//!             region: "us-east-1".to_string(),
//!             credentials_secret_ref: Some(LocalObjectReference::new("aws-creds")),
//!             user_tags: None,
//!             private_link: None,
//!         }),
//!         azure: None,
//!         gcp: None,
//!     },
//!     pull_secret_ref: Some(LocalObjectReference::new("pull-secret")),
//!     provisioning: Some(Provisioning {
//!         image_set_ref: Some(ClusterImageSetReference {
//!             name: "openshift-v4.14.0".to_string(),
//!         }),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//! ```

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema for a list of embedded objects whose structure is owned by another
/// API (`[]runtime.RawExtension` upstream).
fn preserve_unknown_fields_list(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": "array",
        "items": {
            "type": "object",
            "x-kubernetes-preserve-unknown-fields": true
        }
    })
}

// ============================================================================
// Shared Types
// ============================================================================

/// Reference to an object in the same namespace, by name.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct LocalObjectReference {
    /// Name of the referent.
    pub name: String,
}

impl LocalObjectReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to a secret, optionally in another namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct SecretReference {
    /// Name of the secret.
    pub name: String,

    /// Namespace of the secret. Defaults to the namespace of the referencing object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Label selector to match Kubernetes resources.
///
/// A label selector is a label query over a set of resources. The result of matchLabels and
/// matchExpressions are `ANDed`. An empty label selector matches all objects.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Map of {key,value} pairs. A single {key,value} in the matchLabels map is equivalent
    /// to an element of matchExpressions, whose key field is "key", the operator is "In",
    /// and the values array contains only "value". All requirements must be satisfied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,

    /// List of label selector requirements. All requirements must be satisfied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<LabelSelectorRequirement>>,
}

/// A label selector requirement is a selector that contains values, a key, and an operator
/// that relates the key and values.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LabelSelectorRequirement {
    /// The label key that the selector applies to.
    pub key: String,

    /// Operator represents a key's relationship to a set of values.
    /// Valid operators are In, `NotIn`, Exists and `DoesNotExist`.
    pub operator: String,

    /// An array of string values. If the operator is In or `NotIn`,
    /// the values array must be non-empty. If the operator is Exists or `DoesNotExist`,
    /// the values array must be empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// Condition reported by the Hive controllers in status subresources.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HiveCondition {
    /// Type of condition (e.g. `Provisioned`, `Hibernating`, `Ready`).
    pub r#type: String,

    /// Status of the condition: True, False or Unknown.
    pub status: String,

    /// Machine-readable reason for the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message about the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition was probed (RFC3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<String>,

    /// Last time the condition transitioned (RFC3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Reference to a [`ClusterImageSet`].
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ClusterImageSetReference {
    /// Name of the `ClusterImageSet` that this refers to.
    pub name: String,
}

// ============================================================================
// Cloud Platforms
// ============================================================================

/// Cloud platform a cluster runs on. Exactly one platform must be set.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct Platform {
    /// Amazon Web Services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsPlatform>,

    /// Microsoft Azure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzurePlatform>,

    /// Google Cloud Platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpPlatform>,
}

/// AWS platform configuration.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsPlatform {
    /// Secret holding `aws_access_key_id` and `aws_secret_access_key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_secret_ref: Option<LocalObjectReference>,

    /// AWS region where the cluster is created.
    pub region: String,

    /// Additional tags applied to the AWS resources created for the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_tags: Option<BTreeMap<String, String>>,

    /// AWS PrivateLink access to the cluster API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_link: Option<AwsPrivateLink>,
}

/// AWS PrivateLink toggle.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct AwsPrivateLink {
    pub enabled: bool,
}

/// Azure platform configuration.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzurePlatform {
    /// Secret holding the `osServicePrincipal.json` credentials.
    pub credentials_secret_ref: LocalObjectReference,

    /// Azure region where the cluster is created.
    pub region: String,

    /// Resource group holding the public DNS zone of the base domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_domain_resource_group_name: Option<String>,

    /// Azure cloud environment (e.g. `AzurePublicCloud`, `AzureUSGovernmentCloud`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
}

/// GCP platform configuration.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpPlatform {
    /// Secret holding the `osServiceAccount.json` credentials.
    pub credentials_secret_ref: LocalObjectReference,

    /// GCP region where the cluster is created.
    pub region: String,
}

// ============================================================================
// ClusterDeployment
// ============================================================================

/// Desired power state of a cluster.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum ClusterPowerState {
    /// Cluster machines are running.
    Running,
    /// Cluster machines are stopped.
    Hibernating,
}

/// `ClusterDeployment` is the registry of an OpenShift cluster managed by Hive.
///
/// # Example
///
/// ```yaml
/// apiVersion: hive.openshift.io/v1
/// kind: ClusterDeployment
/// metadata:
///   name: mycluster
///   namespace: mynamespace
/// spec:
///   baseDomain: example.com
///   clusterName: mycluster
///   platform:
///     aws:
///       credentialsSecretRef:
///         name: mycluster-aws-creds
///       region: us-east-1
///   provisioning:
///     imageSetRef:
///       name: openshift-v4.14.0
///     installConfigSecretRef:
///       name: mycluster-install-config
///   pullSecretRef:
///     name: mycluster-pull-secret
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterDeployment",
    namespaced,
    shortname = "cd",
    doc = "ClusterDeployment is the Schema for the clusterdeployments API"
)]
#[kube(status = "ClusterDeploymentStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentSpec {
    /// Friendly name of the cluster. It is used for subdomains, some resource tagging,
    /// and other instances where a friendly name for the cluster is useful.
    #[schemars(length(min = 1))]
    pub cluster_name: String,

    /// Domain of the cluster. `clusterName.baseDomain` is the cluster's DNS domain.
    pub base_domain: String,

    /// Cloud platform and credentials.
    pub platform: Platform,

    /// Secret holding the pull secret used to pull release images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret_ref: Option<LocalObjectReference>,

    /// Keep the cloud resources of the cluster when the `ClusterDeployment` is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_on_delete: Option<bool>,

    /// Configuration of the control plane.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_config: Option<ControlPlaneConfigSpec>,

    /// Ingress controllers created on the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Vec<ClusterIngress>>,

    /// Certificate bundles referenced by the control plane and ingress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_bundles: Option<Vec<CertificateBundleSpec>>,

    /// Let Hive create and manage the DNS zone of the cluster.
    #[serde(rename = "manageDNS", skip_serializing_if = "Option::is_none")]
    pub manage_dns: Option<bool>,

    /// Metadata of an installed cluster, set when adopting an existing cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_metadata: Option<ClusterMetadata>,

    /// Whether the cluster is installed. Set to true when adopting a cluster.
    #[serde(default)]
    pub installed: bool,

    /// Install configuration. Required unless the cluster is adopted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning: Option<Provisioning>,

    /// Pool this cluster was created from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_pool_ref: Option<ClusterPoolReference>,

    /// Desired power state of the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<ClusterPowerState>,

    /// Hibernate the cluster after it has been running for this long (Go duration).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hibernate_after: Option<String>,

    /// Maximum number of install attempts before giving up.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub install_attempts_limit: Option<i32>,
}

/// Control plane configuration.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfigSpec {
    /// Serving certificates of the API server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_certificates: Option<ControlPlaneServingCertificateSpec>,

    /// URL used by Hive to reach the API server instead of the default one.
    #[serde(rename = "apiURLOverride", skip_serializing_if = "Option::is_none")]
    pub api_url_override: Option<String>,
}

/// Serving certificates of the API server.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ControlPlaneServingCertificateSpec {
    /// Name of the certificate bundle used for the default API domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Certificates for additional API domains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<Vec<ControlPlaneAdditionalCertificate>>,
}

/// Certificate for an additional API domain.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ControlPlaneAdditionalCertificate {
    /// Name of the certificate bundle.
    pub name: String,
    /// Domain served with the certificate.
    pub domain: String,
}

/// Ingress controller of a cluster.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIngress {
    /// Name of the ingress controller.
    pub name: String,

    /// Domain served by the ingress controller.
    pub domain: String,

    /// Restrict the routes served by this ingress controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_selector: Option<LabelSelector>,

    /// Restrict the namespaces served by this ingress controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,

    /// Name of the certificate bundle used by this ingress controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_certificate: Option<String>,
}

/// Named certificate bundle.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBundleSpec {
    /// Name of the bundle, referenced from control plane and ingress settings.
    pub name: String,

    /// Generate the certificate with Hive's certificate controller.
    #[serde(default)]
    pub generate: bool,

    /// Secret holding the certificate.
    pub certificate_secret_ref: LocalObjectReference,
}

/// Metadata of an installed cluster.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMetadata {
    /// Cluster identifier assigned by the installer.
    #[serde(rename = "clusterID")]
    pub cluster_id: String,

    /// Infrastructure identifier used to name and tag cloud resources.
    #[serde(rename = "infraID")]
    pub infra_id: String,

    /// Secret holding the admin kubeconfig of the cluster.
    pub admin_kubeconfig_secret_ref: LocalObjectReference,

    /// Secret holding the admin password of the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password_secret_ref: Option<LocalObjectReference>,
}

/// Install configuration of a cluster.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Provisioning {
    /// Secret holding the `install-config.yaml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_config_secret_ref: Option<LocalObjectReference>,

    /// Release image to install. Takes precedence over `imageSetRef`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_image: Option<String>,

    /// `ClusterImageSet` holding the release image to install.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_set_ref: Option<ClusterImageSetReference>,

    /// ConfigMap holding additional manifests for the installer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifests_config_map_ref: Option<LocalObjectReference>,

    /// Secret holding the SSH private key used to gather logs on failed installs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_private_key_secret_ref: Option<LocalObjectReference>,

    /// Known hosts entries used when connecting over SSH.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_known_hosts: Option<Vec<String>>,
}

/// Reference to the pool and claim of a pooled cluster.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPoolReference {
    /// Namespace of the pool.
    pub namespace: String,

    /// Name of the pool.
    pub pool_name: String,

    /// Name of the claim holding the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_name: Option<String>,

    /// Customization applied to the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization_ref: Option<LocalObjectReference>,
}

/// Observed state of a `ClusterDeployment`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentStatus {
    /// Number of times the install pod was restarted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_restarts: Option<i32>,

    /// URL of the cluster API server.
    #[serde(rename = "apiURL", skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// URL of the web console.
    #[serde(rename = "webConsoleURL", skip_serializing_if = "Option::is_none")]
    pub web_console_url: Option<String>,

    /// Time the cluster finished installing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_timestamp: Option<String>,

    /// Observed power state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

// ============================================================================
// ClusterDeploymentCustomization
// ============================================================================

/// `ClusterDeploymentCustomization` holds install-config patches applied to clusters
/// created by a pool.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterDeploymentCustomization",
    namespaced,
    doc = "ClusterDeploymentCustomization is the Schema for clusterdeploymentcustomizations API"
)]
#[kube(status = "ClusterDeploymentCustomizationStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentCustomizationSpec {
    /// JSON patches applied to the install config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_config_patches: Option<Vec<PatchEntity>>,
}

/// A single RFC 6902 JSON patch operation.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct PatchEntity {
    /// Operation: add, remove, replace, move, copy or test.
    #[schemars(extend("enum" = ["add", "remove", "replace", "move", "copy", "test"]))]
    pub op: String,

    /// JSON pointer to the target field.
    pub path: String,

    /// Source pointer for move and copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Value for add, replace and test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Observed state of a `ClusterDeploymentCustomization`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentCustomizationStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_deployment_ref: Option<LocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_pool_ref: Option<LocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_applied_configuration: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

// ============================================================================
// ClusterDeprovision
// ============================================================================

/// `ClusterDeprovision` removes the cloud resources tagged with a cluster's infra ID.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterDeprovision",
    namespaced,
    doc = "ClusterDeprovision is the Schema for the clusterdeprovisions API"
)]
#[kube(status = "ClusterDeprovisionStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeprovisionSpec {
    /// Infrastructure identifier of the cluster to remove.
    #[serde(rename = "infraID")]
    pub infra_id: String,

    /// Cluster identifier of the cluster to remove.
    #[serde(rename = "clusterID", skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_domain: Option<String>,

    /// Cloud platform and credentials used to find the resources.
    pub platform: ClusterDeprovisionPlatform,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ClusterDeprovisionPlatform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsClusterDeprovision>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureClusterDeprovision>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpClusterDeprovision>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterDeprovision {
    pub region: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_secret_ref: Option<LocalObjectReference>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureClusterDeprovision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_secret_ref: Option<LocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpClusterDeprovision {
    pub region: String,

    pub credentials_secret_ref: LocalObjectReference,
}

/// Observed state of a `ClusterDeprovision`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ClusterDeprovisionStatus {
    /// True once every resource tagged with the infra ID was removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

// ============================================================================
// ClusterImageSet
// ============================================================================

/// `ClusterImageSet` names an OpenShift release image.
///
/// # Example
///
/// ```yaml
/// apiVersion: hive.openshift.io/v1
/// kind: ClusterImageSet
/// metadata:
///   name: openshift-v4.14.0
/// spec:
///   releaseImage: quay.io/openshift-release-dev/ocp-release:4.14.0-x86_64
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterImageSet",
    shortname = "imgset",
    doc = "ClusterImageSet is the Schema for the clusterimagesets API"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterImageSetSpec {
    /// Image that contains the payload to use when installing a cluster.
    pub release_image: String,
}

// ============================================================================
// ClusterPool and ClusterClaim
// ============================================================================

/// `ClusterPool` keeps a number of clusters installed and ready to be claimed.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterPool",
    namespaced,
    shortname = "cp",
    doc = "ClusterPool represents a pool of clusters that should be kept ready to be given out to users"
)]
#[kube(status = "ClusterPoolStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterPoolSpec {
    /// Cloud platform and credentials of the pool clusters.
    pub platform: Platform,

    /// Secret holding the pull secret of the pool clusters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret_ref: Option<LocalObjectReference>,

    /// Number of unclaimed clusters kept in the pool.
    #[schemars(range(min = 0))]
    pub size: i32,

    /// Number of unclaimed clusters kept running instead of hibernating.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub running_count: Option<i32>,

    /// Maximum number of clusters, claimed and unclaimed, created from this pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub max_size: Option<i32>,

    /// Maximum number of clusters installing or deprovisioning at the same time.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub max_concurrent: Option<i32>,

    /// Base domain of the pool clusters.
    pub base_domain: String,

    /// Release image installed on the pool clusters.
    pub image_set_ref: ClusterImageSetReference,

    /// Labels applied to the `ClusterDeployments` of the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Annotations applied to the `ClusterDeployments` of the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Secret holding an `install-config.yaml` template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_config_secret_template_ref: Option<LocalObjectReference>,

    /// Hibernate pool clusters after they have been running for this long.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hibernate_after: Option<String>,

    /// Do not create MachinePools for the pool clusters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_machine_pools: Option<bool>,

    /// Default and maximum lifetime of claims on this pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_lifetime: Option<ClusterPoolClaimLifetime>,

    /// Customizations applied to clusters created by this pool, one per cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<InventoryEntry>>,
}

/// Claim lifetime limits of a pool (Go durations).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ClusterPoolClaimLifetime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
}

/// Entry of a pool inventory.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct InventoryEntry {
    /// Kind of the referenced object. Only `ClusterDeploymentCustomization` is supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Name of the referenced object.
    pub name: String,
}

/// Observed state of a `ClusterPool`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ClusterPoolStatus {
    /// Number of unclaimed clusters that are installing or installed.
    #[serde(default)]
    pub size: i32,

    /// Number of unclaimed clusters that are installed but not running.
    #[serde(default)]
    pub standby: i32,

    /// Number of unclaimed clusters that are installed and running.
    #[serde(default)]
    pub ready: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

/// `ClusterClaim` requests a cluster from a [`ClusterPool`].
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterClaim",
    namespaced,
    doc = "ClusterClaim represents a claim to a cluster from a cluster pool"
)]
#[kube(status = "ClusterClaimStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterClaimSpec {
    /// Name of the pool, in the same namespace, to claim a cluster from.
    pub cluster_pool_name: String,

    /// Subjects granted admin access to the claimed cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<RbacSubject>>,

    /// Namespace of the claimed `ClusterDeployment`. Set by Hive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Delete the claimed cluster after this long (Go duration).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
}

/// RBAC subject (user, group or service account).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RbacSubject {
    /// Kind of subject: User, Group or `ServiceAccount`.
    #[schemars(extend("enum" = ["User", "Group", "ServiceAccount"]))]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Observed state of a `ClusterClaim`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ClusterClaimStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

// ============================================================================
// ClusterRelocate and Checkpoint
// ============================================================================

/// `ClusterRelocate` moves matching `ClusterDeployments` to another Hive instance.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterRelocate",
    doc = "ClusterRelocate is the Schema for the clusterrelocates API"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRelocateSpec {
    /// Secret holding the kubeconfig of the destination Hive instance.
    pub kubeconfig_secret_ref: KubeconfigSecretReference,

    /// `ClusterDeployments` to relocate.
    pub cluster_deployment_selector: LabelSelector,
}

/// Reference to a kubeconfig secret in a given namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct KubeconfigSecretReference {
    pub namespace: String,
    pub name: String,
}

/// `Checkpoint` records the last Hive state backup.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "Checkpoint",
    namespaced,
    doc = "Checkpoint is the Schema for the backup of Hive objects"
)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointSpec {
    /// Checksum of the objects included in the last backup.
    pub last_backup_checksum: String,

    /// Time of the last backup (RFC3339).
    pub last_backup_time: String,

    /// Backup object of the last backup.
    pub last_backup_ref: BackupReference,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct BackupReference {
    pub name: String,
    pub namespace: String,
}

// ============================================================================
// DNSZone
// ============================================================================

/// `DNSZone` is a DNS zone Hive manages in a cloud provider.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "DNSZone",
    namespaced,
    doc = "DNSZone is the Schema for the dnszones API"
)]
#[kube(status = "DNSZoneStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSZoneSpec {
    /// DNS zone (e.g. `mycluster.example.com`).
    pub zone: String,

    /// Create NS records for the zone in the parent domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to_parent_domain: Option<bool>,

    /// Keep the cloud DNS zone when the `DNSZone` is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_on_delete: Option<bool>,

    /// Route53 configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsDnsZoneSpec>,

    /// Cloud DNS configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpDnsZoneSpec>,

    /// Azure DNS configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureDnsZoneSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsDnsZoneSpec {
    pub credentials_secret_ref: LocalObjectReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Tags applied to the hosted zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_tags: Option<Vec<AwsResourceTag>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct AwsResourceTag {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpDnsZoneSpec {
    pub credentials_secret_ref: LocalObjectReference,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureDnsZoneSpec {
    pub credentials_secret_ref: LocalObjectReference,

    /// Resource group holding the zone.
    pub resource_group_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
}

/// Observed state of a `DNSZone`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSZoneStatus {
    /// Name servers of the zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_servers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

// ============================================================================
// HiveConfig
// ============================================================================

/// Deletion protection setting of the Hive operator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum DeleteProtectionType {
    /// `ClusterDeployments` are annotated to block deletion.
    #[serde(rename = "enabled")]
    Enabled,
}

/// `HiveConfig` configures the Hive operator. Hive only honours the object named `hive`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "HiveConfig",
    doc = "HiveConfig is the Schema for the hives API"
)]
#[serde(rename_all = "camelCase")]
pub struct HiveConfigSpec {
    /// Namespace where the Hive components run. Defaults to `hive`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    /// Domains for which Hive manages DNS zones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_domains: Option<Vec<ManageDnsConfig>>,

    /// Secrets holding additional certificate authorities trusted by Hive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_certificate_authorities_secret_ref: Option<Vec<LocalObjectReference>>,

    /// Pull secret merged into the pull secret of every cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_pull_secret_ref: Option<LocalObjectReference>,

    /// Stop reconciling `ClusterDeployments` while performing maintenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,

    /// Block deletion of `ClusterDeployments` until an annotation is removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_protection: Option<DeleteProtectionType>,

    /// Log level of the Hive controllers.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(extend("enum" = ["debug", "info", "warn", "error"]))]
    pub log_level: Option<String>,

    /// Interval between reapplies of `SyncSets` (Go duration).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_set_reapply_interval: Option<String>,

    /// ConfigMap holding keys used to verify release images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_image_verification_config_map_ref: Option<ConfigMapReference>,
}

/// DNS management settings for a set of domains.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ManageDnsConfig {
    /// Domains managed with these credentials.
    pub domains: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<ManageDnsAwsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<ManageDnsGcpConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManageDnsAwsConfig {
    pub credentials_secret_ref: LocalObjectReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManageDnsGcpConfig {
    pub credentials_secret_ref: LocalObjectReference,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct ConfigMapReference {
    pub namespace: String,
    pub name: String,
}

// ============================================================================
// MachinePool
// ============================================================================

/// Effect of a node taint.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

/// `MachinePool` describes a set of worker machines of a cluster.
///
/// # Example
///
/// ```yaml
/// apiVersion: hive.openshift.io/v1
/// kind: MachinePool
/// metadata:
///   name: mycluster-worker
///   namespace: mynamespace
/// spec:
///   clusterDeploymentRef:
///     name: mycluster
///   name: worker
///   replicas: 3
///   platform:
///     aws:
///       type: m5.xlarge
///       rootVolume:
///         size: 120
///         type: gp3
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "MachinePool",
    namespaced,
    doc = "MachinePool is the Schema for the machinepools API"
)]
#[kube(status = "MachinePoolStatus")]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolSpec {
    /// `ClusterDeployment` the pool belongs to.
    pub cluster_deployment_ref: LocalObjectReference,

    /// Name of the pool inside the cluster. The object must be named `<cd>-<name>`.
    pub name: String,

    /// Fixed number of machines. Mutually exclusive with `autoscaling`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub replicas: Option<i64>,

    /// Autoscaling bounds. Mutually exclusive with `replicas`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<MachinePoolAutoscaling>,

    /// Cloud-specific machine configuration.
    pub platform: MachinePoolPlatform,

    /// Labels applied to the nodes of the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Labels applied to the Machine objects of the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_labels: Option<BTreeMap<String, String>>,

    /// Taints applied to the nodes of the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taints: Option<Vec<Taint>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolAutoscaling {
    #[schemars(range(min = 0))]
    pub min_replicas: i32,

    #[schemars(range(min = 0))]
    pub max_replicas: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct MachinePoolPlatform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsMachinePoolPlatform>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureMachinePoolPlatform>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpMachinePoolPlatform>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsMachinePoolPlatform {
    /// Availability zones of the machines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,

    /// Subnets of the machines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Vec<String>>,

    /// EC2 instance type (e.g. `m5.xlarge`).
    #[serde(rename = "type")]
    pub instance_type: String,

    /// Root volume of the machines.
    pub root_volume: AwsVolume,

    /// Tags applied to the machines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_tags: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsVolume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,

    /// Size in GiB.
    #[schemars(range(min = 0))]
    pub size: i32,

    /// Volume type (e.g. `gp3`).
    #[serde(rename = "type")]
    pub volume_type: String,

    #[serde(rename = "kmsKeyARN", skip_serializing_if = "Option::is_none")]
    pub kms_key_arn: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachinePoolPlatform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,

    /// Virtual machine size (e.g. `Standard_D4s_v3`).
    #[serde(rename = "type")]
    pub instance_type: String,

    pub os_disk: AzureOsDisk,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct AzureOsDisk {
    /// Size in GB.
    #[serde(rename = "diskSizeGB")]
    #[schemars(range(min = 0))]
    pub disk_size_gb: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct GcpMachinePoolPlatform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,

    /// Machine type (e.g. `n1-standard-4`).
    #[serde(rename = "type")]
    pub instance_type: String,
}

/// Node taint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Taint {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    pub effect: TaintEffect,
}

/// Observed state of a `MachinePool`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct MachinePoolStatus {
    /// Number of machines in the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<HiveCondition>,
}

/// `MachinePoolNameLease` reserves a short name for a machine pool.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "MachinePoolNameLease",
    namespaced,
    doc = "MachinePoolNameLease is the Schema for the MachinePoolNameLeases API"
)]
pub struct MachinePoolNameLeaseSpec {}

// ============================================================================
// SyncSet and SelectorSyncSet
// ============================================================================

/// How resources removed from a sync set are handled.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum ResourceApplyMode {
    /// Resources removed from the set are left on the cluster.
    Upsert,
    /// Resources removed from the set are deleted from the cluster.
    Sync,
}

/// How resources are applied to the target cluster.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum SyncSetApplyBehavior {
    Apply,
    CreateOnly,
    CreateOrUpdate,
}

/// Fields shared by [`SyncSetSpec`] and [`SelectorSyncSetSpec`].
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncSetCommonSpec {
    /// Objects applied to the target clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields_list")]
    pub resources: Option<Vec<Value>>,

    /// What happens to resources removed from the set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_apply_mode: Option<ResourceApplyMode>,

    /// Patches applied to existing objects of the target clusters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patches: Option<Vec<SyncObjectPatch>>,

    /// Secrets copied from the hub to the target clusters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_mappings: Option<Vec<SecretMapping>>,

    /// How resources are applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_behavior: Option<SyncSetApplyBehavior>,

    /// Process Go templates in the resources before applying them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_resource_templates: Option<bool>,
}

/// Patch applied to an object on the target cluster.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncObjectPatch {
    pub api_version: String,

    pub kind: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// The patch document.
    pub patch: String,

    /// Patch type: json, merge or strategic. Defaults to strategic.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(extend("enum" = ["json", "merge", "strategic"]))]
    pub patch_type: Option<String>,
}

/// Secret copied from the hub to the target cluster.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretMapping {
    pub source_ref: SecretReference,
    pub target_ref: SecretReference,
}

/// `SyncSet` applies resources and patches to the listed `ClusterDeployments`.
///
/// # Example
///
/// ```yaml
/// apiVersion: hive.openshift.io/v1
/// kind: SyncSet
/// metadata:
///   name: mygroup
///   namespace: mynamespace
/// spec:
///   clusterDeploymentRefs:
///   - name: mycluster
///   resourceApplyMode: Sync
///   resources:
///   - apiVersion: v1
///     kind: ConfigMap
///     metadata:
///       name: myconfigmap
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "SyncSet",
    namespaced,
    shortname = "ss",
    doc = "SyncSet is the Schema for the SyncSet API"
)]
#[serde(rename_all = "camelCase")]
pub struct SyncSetSpec {
    #[serde(flatten)]
    pub common: SyncSetCommonSpec,

    /// `ClusterDeployments`, in the same namespace, the set applies to.
    pub cluster_deployment_refs: Vec<LocalObjectReference>,
}

/// `SelectorSyncSet` applies resources and patches to every `ClusterDeployment`
/// matching a label selector.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "SelectorSyncSet",
    shortname = "sss",
    doc = "SelectorSyncSet is the Schema for the SelectorSyncSet API"
)]
#[serde(rename_all = "camelCase")]
pub struct SelectorSyncSetSpec {
    #[serde(flatten)]
    pub common: SyncSetCommonSpec,

    /// `ClusterDeployments` the set applies to.
    #[serde(default)]
    pub cluster_deployment_selector: LabelSelector,
}

/// CustomResourceDefinitions of every Hive kind, sorted by kind.
#[must_use]
pub fn hive_crds() -> Vec<CustomResourceDefinition> {
    let mut crds = vec![
        Checkpoint::crd(),
        ClusterClaim::crd(),
        ClusterDeployment::crd(),
        ClusterDeploymentCustomization::crd(),
        ClusterDeprovision::crd(),
        ClusterImageSet::crd(),
        ClusterPool::crd(),
        ClusterRelocate::crd(),
        DNSZone::crd(),
        HiveConfig::crd(),
        MachinePool::crd(),
        MachinePoolNameLease::crd(),
        SelectorSyncSet::crd(),
        SyncSet::crd(),
    ];
    crds.sort_by(|a, b| a.spec.names.kind.cmp(&b.spec.names.kind));
    crds
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
