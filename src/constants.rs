// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Hive provider.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all Hive CRDs
pub const API_GROUP: &str = "hive.openshift.io";

/// API version for all Hive CRDs
pub const API_VERSION: &str = "v1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "hive.openshift.io/v1";

/// Kind name for `ClusterDeployment` resource
pub const KIND_CLUSTER_DEPLOYMENT: &str = "ClusterDeployment";

/// Kind name for `ClusterImageSet` resource
pub const KIND_CLUSTER_IMAGE_SET: &str = "ClusterImageSet";

/// Kind name for `ClusterPool` resource
pub const KIND_CLUSTER_POOL: &str = "ClusterPool";

/// Kind name for `MachinePool` resource
pub const KIND_MACHINE_POOL: &str = "MachinePool";

/// Kind name for `SyncSet` resource
pub const KIND_SYNC_SET: &str = "SyncSet";

// ============================================================================
// Provider Constants
// ============================================================================

/// Provider type name, the prefix of every resource and data source type name
pub const PROVIDER_TYPE_NAME: &str = "hive";

/// Suffix appended to the type name of manifest data sources
pub const MANIFEST_SUFFIX: &str = "_manifest";

/// Field manager used for server-side apply when none is configured
pub const DEFAULT_FIELD_MANAGER: &str = "terraform-provider-hive";

/// Schema version reported for every resource and data source
pub const SCHEMA_VERSION: i64 = 0;

// ============================================================================
// Environment Variables
// ============================================================================

/// Path of the kubeconfig file
pub const ENV_KUBECONFIG: &str = "KUBECONFIG";

/// Kubeconfig context to use
pub const ENV_CONTEXT: &str = "HIVE_PROVIDER_CONTEXT";

/// Field manager override
pub const ENV_FIELD_MANAGER: &str = "HIVE_PROVIDER_FIELD_MANAGER";

/// Disable all API calls (manifest data sources only)
pub const ENV_OFFLINE: &str = "HIVE_PROVIDER_OFFLINE";

// ============================================================================
// Timing Constants
// ============================================================================

/// Default timeout for `wait_for_upsert` after create and update (10 minutes)
pub const DEFAULT_UPSERT_TIMEOUT_SECS: u64 = 600;

/// Default timeout for `wait_for_delete` (10 minutes)
pub const DEFAULT_DELETE_TIMEOUT_SECS: u64 = 600;

/// Interval between GET calls while waiting (5 seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

// ============================================================================
// Kubernetes Name Limits
// ============================================================================

/// Maximum length of a DNS-1123 subdomain (`metadata.name`)
pub const MAX_DNS_SUBDOMAIN_LENGTH: usize = 253;

/// Maximum length of a DNS-1123 label (`metadata.namespace`, label names)
pub const MAX_DNS_LABEL_LENGTH: usize = 63;
