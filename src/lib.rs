// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Hive provider - OpenShift Hive CRDs as Terraform resources
//!
//! This crate exposes the custom resources of the Hive operator
//! (`hive.openshift.io/v1`) as Terraform-style resources and data sources.
//!
//! ## Overview
//!
//! Every CRD kind maps mechanically to:
//!
//! - a typed model mirroring the CRD's OpenAPI schema ([`crd`])
//! - an attribute schema with `snake_case` names ([`schema`], [`kind`])
//! - create, read, update, delete and import operations that translate the plan
//!   ([`convert`]), server-side apply it through a dynamic client ([`client`]) and
//!   write the server's response back into state ([`resource`])
//!
//! Failures surface as [`diagnostics`] instead of errors, the way a plugin host
//! expects them.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types of the Hive API group
//! - [`provider`] - Provider configuration and the type registry
//! - [`resource`] - Generic resource lifecycle
//! - [`data_source`] - Object and manifest data sources
//! - [`client`] - Dynamic Kubernetes client and its kube-backed implementation
//! - [`memory`] - In-memory client with server-side apply field ownership
//! - [`wait`] - Waiting for field values and for deletion
//!
//! ## Example
//!
//! ```rust,no_run
//! use hive_provider::memory::InMemoryObjectClient;
//! use hive_provider::provider::Provider;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let provider = Provider::hive().with_client(Arc::new(InMemoryObjectClient::new()));
//!
//! let response = provider
//!     .create(
//!         "hive_cluster_image_set_v1",
//!         &json!({
//!             "metadata": {"name": "openshift-v4.14.0"},
//!             "spec": {"release_image": "quay.io/openshift-release-dev/ocp-release:4.14.0-x86_64"}
//!         }),
//!     )
//!     .await;
//! assert!(!response.diagnostics.has_error());
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod context;
pub mod convert;
pub mod crd;
pub mod data_source;
pub mod diagnostics;
pub mod duration;
pub mod field_path;
pub mod kind;
pub mod memory;
pub mod model;
pub mod naming;
pub mod provider;
pub mod resource;
pub mod retry;
pub mod schema;
pub mod validation;
pub mod wait;
