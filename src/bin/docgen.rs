// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider Markdown Documentation Generator
//!
//! Generates the markdown reference of every resource and data source from the
//! provider schema, so the docs always match the attribute names and
//! constraints the provider enforces.
//!
//! Usage:
//!   cargo run --bin docgen > docs/reference.md

use hive_provider::provider::Provider;
use hive_provider::schema::{Attribute, AttributeKind, Nesting, Schema, ValueType};
use std::collections::BTreeMap;

fn main() {
    let provider = Provider::hive();
    let schema = provider.schema();

    println!("# Hive Provider Reference");
    println!();
    println!("> **Note**: This file is AUTO-GENERATED from the provider schema");
    println!("> DO NOT EDIT MANUALLY - Run `cargo run --bin docgen` to regenerate");
    println!();

    println!("## Table of Contents");
    println!();
    println!("- [Provider Configuration](#provider-configuration)");
    println!("- [Resources](#resources)");
    for name in schema.resources.keys() {
        println!("  - [{name}](#{})", anchor(name));
    }
    println!("- [Data Sources](#data-sources)");
    for name in schema.data_sources.keys() {
        println!("  - [{name}](#{})", anchor(name));
    }
    println!();

    if let Some(provider_schema) = &schema.provider {
        println!("## Provider Configuration");
        println!();
        print_schema("", provider_schema);
    }

    println!("## Resources");
    println!();
    for (name, resource) in &schema.resources {
        print_schema(name, resource);
    }

    println!("## Data Sources");
    println!();
    for (name, data_source) in &schema.data_sources {
        print_schema(name, data_source);
    }
}

fn anchor(name: &str) -> String {
    name.to_lowercase()
}

fn print_schema(name: &str, schema: &Schema) {
    if !name.is_empty() {
        println!("### {name}");
        println!();
    }
    println!("{}", escape(&schema.description));
    println!();
    println!("| Attribute | Type | Mode | Description |");
    println!("| --------- | ---- | ---- | ----------- |");
    print_attributes(&schema.attributes, "");
    println!();
    println!("---");
    println!();
}

fn print_attributes(attributes: &BTreeMap<String, Attribute>, prefix: &str) {
    for (name, attr) in attributes {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let mut description = escape(&attr.description);
        if attr.requires_replace {
            description.push_str(" Changing it forces a new resource.");
        }
        println!(
            "| `{path}` | {} | {} | {} |",
            type_string(attr),
            mode(attr),
            description.trim()
        );

        if let AttributeKind::Nested { nesting, attributes } = &attr.kind {
            let nested_prefix = match nesting {
                Nesting::Single => path,
                Nesting::List => format!("{path}[]"),
            };
            print_attributes(attributes, &nested_prefix);
        }
    }
}

fn mode(attr: &Attribute) -> &'static str {
    match (attr.required, attr.optional, attr.computed) {
        (true, _, _) => "Required",
        (false, true, true) => "Optional, Computed",
        (false, false, true) => "Computed",
        _ => "Optional",
    }
}

fn type_string(attr: &Attribute) -> String {
    match &attr.kind {
        AttributeKind::Value(value_type) => value_type_string(value_type),
        AttributeKind::Nested {
            nesting: Nesting::Single,
            ..
        } => "object".to_string(),
        AttributeKind::Nested {
            nesting: Nesting::List,
            ..
        } => "list(object)".to_string(),
    }
}

fn value_type_string(value_type: &ValueType) -> String {
    match value_type {
        ValueType::String => "string".to_string(),
        ValueType::Int64 => "number (int64)".to_string(),
        ValueType::Float64 => "number".to_string(),
        ValueType::Bool => "bool".to_string(),
        ValueType::Dynamic => "any".to_string(),
        ValueType::List { element } => format!("list({})", value_type_string(element)),
        ValueType::Map { element } => format!("map({})", value_type_string(element)),
    }
}

fn escape(description: &str) -> String {
    // Escape pipe characters in descriptions for markdown tables
    description.replace('|', "\\|").replace('\n', " ")
}
