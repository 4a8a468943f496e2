// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line front end of the Hive provider.
//!
//! Each subcommand runs one provider operation. Payloads are JSON, read from
//! `--file` or stdin, and the response `{state, diagnostics}` is printed to
//! stdout. The exit code is 1 when the response carries an error diagnostic.
//! Logs go to stderr.

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use hive_provider::constants::MANIFEST_SUFFIX;
use hive_provider::crd::hive_crds;
use hive_provider::provider::{Provider, ProviderConfig};
use hive_provider::resource::ResourceResponse;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Manage OpenShift Hive custom resources
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-hive", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Provider configuration flags. Flags win over `--config`, which wins over
/// the environment.
#[derive(Args, Debug)]
struct ProviderArgs {
    /// JSON file with the provider configuration block
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path of the kubeconfig file
    #[arg(long, global = true)]
    kubeconfig: Option<String>,

    /// Kubeconfig context
    #[arg(long, global = true)]
    context: Option<String>,

    /// Default field manager for server-side apply
    #[arg(long, global = true)]
    field_manager: Option<String>,

    /// Do not contact any API server; `--offline=false` overrides the environment
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    offline: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the provider, resource and data source schemas
    Schema,

    /// List the resource and data source type names
    Types,

    /// Print the Hive CustomResourceDefinitions as YAML
    Crds,

    /// Create a resource from a plan
    Create(PayloadArgs),

    /// Refresh a resource from its state
    Read(PayloadArgs),

    /// Update a resource from a plan and its prior state
    Update(UpdateArgs),

    /// Delete a resource given its state
    Delete(PayloadArgs),

    /// Import an existing object
    Import(ImportArgs),

    /// Read a data source from its configuration
    Data(PayloadArgs),
}

#[derive(Args, Debug)]
struct PayloadArgs {
    /// Resource or data source type name, e.g. hive_cluster_deployment_v1
    type_name: String,

    /// JSON payload file; stdin when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[command(flatten)]
    payload: PayloadArgs,

    /// JSON file with the prior state
    #[arg(long)]
    prior: PathBuf,
}

#[derive(Args, Debug)]
struct ImportArgs {
    type_name: String,

    /// Import identifier: namespace/name, or name for cluster-scoped kinds
    #[arg(long)]
    id: String,
}

impl ProviderArgs {
    /// Explicit configuration: flags over the `--config` file.
    fn explicit_config(&self) -> Result<ProviderConfig> {
        let file = match &self.config {
            Some(path) => ProviderConfig::from_file(path)?,
            None => ProviderConfig::default(),
        };
        let flags = ProviderConfig {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            field_manager: self.field_manager.clone(),
            offline: self.offline,
        };
        Ok(flags.merge(file))
    }
}

impl Commands {
    /// Whether the command needs a configured provider.
    fn needs_configuration(&self) -> bool {
        match self {
            Self::Schema | Self::Types | Self::Crds => false,
            Self::Data(args) => !args.type_name.ends_with(MANIFEST_SUFFIX),
            _ => true,
        }
    }
}

fn main() -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("hive-provider")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

fn init_logging() {
    // RUST_LOG selects the level (default info), RUST_LOG_FORMAT=json|text the format.
    // stdout carries command output, so logs are written to stderr.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_thread_names(true)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_thread_names(true)
                // stderr is usually captured by the plugin host, not a terminal
                .with_ansi(false)
                .compact()
                .init();
        }
    }
}

async fn async_main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();
    debug!(command = ?cli.command, "Parsed command line");

    let mut provider = Provider::hive();

    match &cli.command {
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&provider.schema())?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Types => {
            for type_name in provider.resource_types() {
                println!("resource\t{type_name}");
            }
            for type_name in provider.data_source_types() {
                println!("data\t{type_name}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Crds => {
            for crd in hive_crds() {
                println!("---");
                print!("{}", serde_yaml::to_string(&crd).context("Failed to serialize CRD")?);
            }
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    if cli.command.needs_configuration() {
        let diagnostics = provider.configure(cli.provider.explicit_config()?).await;
        if diagnostics.has_error() {
            return emit(&ResourceResponse::failed(diagnostics));
        }
    }

    let response = run(&provider, cli.command).await?;
    emit(&response)
}

async fn run(provider: &Provider, command: Commands) -> Result<ResourceResponse> {
    let response = match command {
        Commands::Create(args) => {
            let plan = read_payload(args.file.as_deref()).await?;
            info!(type_name = %args.type_name, operation = "create", "Running operation");
            provider.create(&args.type_name, &plan).await
        }
        Commands::Read(args) => {
            let state = read_payload(args.file.as_deref()).await?;
            provider.read(&args.type_name, &state).await
        }
        Commands::Update(args) => {
            let plan = read_payload(args.payload.file.as_deref()).await?;
            let prior = read_payload(Some(args.prior.as_path())).await?;
            info!(type_name = %args.payload.type_name, operation = "update", "Running operation");
            provider.update(&args.payload.type_name, &plan, &prior).await
        }
        Commands::Delete(args) => {
            let state = read_payload(args.file.as_deref()).await?;
            info!(type_name = %args.type_name, operation = "delete", "Running operation");
            provider.delete(&args.type_name, &state).await
        }
        Commands::Import(args) => provider.import(&args.type_name, &args.id).await,
        Commands::Data(args) => {
            let config = read_payload(args.file.as_deref()).await?;
            provider.read_data_source(&args.type_name, &config).await
        }
        Commands::Schema | Commands::Types | Commands::Crds => ResourceResponse::default(),
    };
    Ok(response)
}

/// Read a JSON payload from `path`, or stdin when `None`.
async fn read_payload(path: Option<&Path>) -> Result<Value> {
    let contents = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read payload {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };
    parse_payload(&contents)
}

fn parse_payload(contents: &str) -> Result<Value> {
    if contents.trim().is_empty() {
        anyhow::bail!("Payload is empty");
    }
    serde_json::from_str(contents).context("Payload is not valid JSON")
}

fn emit(response: &ResourceResponse) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(if response.diagnostics.has_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
