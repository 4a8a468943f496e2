// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-kind information extracted from a CRD type.

use crate::naming::{manifest_type_name, type_name};
use crate::schema::{self, Attribute, Schema};
use kube::core::ApiResource;
use kube::{CustomResourceExt, Resource};

/// Everything the generic handlers need to know about one CRD kind.
#[derive(Clone, Debug)]
pub struct KindInfo {
    pub api_resource: ApiResource,
    pub namespaced: bool,
    pub description: String,
    /// The `spec` attribute derived from the CRD schema, if the kind has a spec.
    pub spec: Option<Attribute>,
}

impl KindInfo {
    /// Build the kind information from the generated CRD of `K`.
    #[must_use]
    pub fn of<K>() -> Self
    where
        K: CustomResourceExt + Resource<DynamicType = ()>,
    {
        let crd = K::crd();
        let kind = K::kind(&());
        let namespaced = crd.spec.scope == "Namespaced";

        let root = crd
            .spec
            .versions
            .first()
            .and_then(|v| v.schema.as_ref())
            .and_then(|s| s.open_api_v3_schema.as_ref());

        let default_desc = format!("{kind} of the {} API group.", K::group(&()));
        let description = root
            .and_then(|schema| schema.description.clone())
            .unwrap_or(default_desc);

        let spec = root.and_then(|schema| {
            let spec_props = schema.properties.as_ref()?.get("spec")?;
            let required = schema
                .required
                .as_ref()
                .is_some_and(|r| r.iter().any(|f| f == "spec"));
            Some(schema::from_json_schema("spec", spec_props, required))
        });

        Self {
            api_resource: ApiResource::erase::<K>(&()),
            namespaced,
            description,
            spec,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.api_resource.kind
    }

    #[must_use]
    pub fn type_name(&self) -> String {
        type_name(&self.api_resource.kind, &self.api_resource.version)
    }

    #[must_use]
    pub fn manifest_type_name(&self) -> String {
        manifest_type_name(&self.api_resource.kind, &self.api_resource.version)
    }

    /// Spec attributes keyed by attribute name.
    #[must_use]
    pub fn spec_attributes(&self) -> Option<&std::collections::BTreeMap<String, Attribute>> {
        self.spec.as_ref().and_then(Attribute::attributes)
    }

    #[must_use]
    pub fn resource_schema(&self) -> Schema {
        schema::resource_schema(&self.description, self.namespaced, self.spec.as_ref())
    }

    #[must_use]
    pub fn data_source_schema(&self) -> Schema {
        schema::data_source_schema(&self.description, self.namespaced, self.spec.as_ref())
    }

    #[must_use]
    pub fn manifest_schema(&self) -> Schema {
        schema::manifest_schema(&self.description, self.namespaced, self.spec.as_ref())
    }
}

#[cfg(test)]
#[path = "kind_tests.rs"]
mod kind_tests;
