// crates/catalog-cli/src/main.rs
// ============================================================================
// Module: Service Catalog CLI Entry Point
// Description: Command dispatcher for the catalog service and one-shot commands.
// Purpose: Run the view sync engine and expose catalog operations from the shell.
// Dependencies: clap, catalog-cli, catalog-config, catalog-core, serde, serde_json, thiserror, tokio.
// ============================================================================

//! ## Overview
//! `service-catalog serve` owns the view sync engine for the life of the
//! process and exits non-zero when the engine reports a fatal failure. The
//! `service` and `version` commands run one catalog operation, print the
//! result as a JSON line, and flush any pending projection refresh before
//! exiting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use catalog_cli::CatalogRuntime;
use catalog_config::CatalogConfig;
use catalog_core::CatalogError;
use catalog_core::CatalogOperations;
use catalog_core::FetchServicesRequest;
use catalog_core::NameFilter;
use catalog_core::PageRequest;
use catalog_core::ServiceId;
use catalog_core::SortKey;
use catalog_core::VersionTag;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "service-catalog", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to service-catalog.toml or `SERVICE_CATALOG_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the view sync engine until interrupted.
    Serve,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Service catalog entries.
    Service {
        /// Selected service subcommand.
        #[command(subcommand)]
        command: ServiceCommand,
    },
    /// Versions of a service.
    Version {
        /// Selected version subcommand.
        #[command(subcommand)]
        command: VersionCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a service catalog configuration file.
    Validate,
}

/// Service subcommands.
#[derive(Subcommand, Debug)]
enum ServiceCommand {
    /// Register a new service.
    Add {
        /// Unique service name.
        #[arg(long)]
        name: String,
        /// Free-form description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename or re-describe a service.
    Update {
        /// Service identifier.
        #[arg(long)]
        id: u64,
        /// New unique name.
        #[arg(long)]
        name: String,
        /// New description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Remove a service and its versions.
    Remove {
        /// Service identifier.
        #[arg(long)]
        id: u64,
    },
    /// Show one service.
    Get {
        /// Service identifier.
        #[arg(long)]
        id: u64,
    },
    /// List services one page at a time.
    List(ServiceListArgs),
}

/// Arguments for `service list`.
#[derive(Args, Debug)]
struct ServiceListArgs {
    /// 1-based page number; 0 is treated as 1.
    #[arg(long, default_value_t = 1)]
    page: u64,
    /// Rows per page (defaults to `pagination.default_page_size`).
    #[arg(long)]
    page_size: Option<u64>,
    /// Listing order.
    #[arg(long, value_enum, default_value_t = SortArg::Date)]
    sort_by: SortArg,
    /// Present the last rows first.
    #[arg(long, action = ArgAction::SetTrue)]
    inverted: bool,
    /// Case-sensitive name substring.
    #[arg(long, default_value = "")]
    name: String,
}

/// Listing order argument.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    /// Registration order (always current).
    Date,
    /// Alphabetical (eventually consistent).
    Name,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Date => Self::Created,
            SortArg::Name => Self::Name,
        }
    }
}

/// Version subcommands.
#[derive(Subcommand, Debug)]
enum VersionCommand {
    /// Register a version.
    Add(VersionWriteArgs),
    /// Replace a version's info.
    Update(VersionWriteArgs),
    /// Remove a version.
    Remove {
        /// Owning service identifier.
        #[arg(long)]
        service_id: u64,
        /// Version tag.
        #[arg(long)]
        tag: String,
    },
    /// List a service's versions newest first.
    List {
        /// Owning service identifier.
        #[arg(long)]
        service_id: u64,
        /// 1-based page number; 0 is treated as 1.
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Rows per page (defaults to `pagination.default_page_size`).
        #[arg(long)]
        page_size: Option<u64>,
    },
}

/// Arguments for version writes.
#[derive(Args, Debug)]
struct VersionWriteArgs {
    /// Owning service identifier.
    #[arg(long)]
    service_id: u64,
    /// Version tag, unique per service.
    #[arg(long)]
    tag: String,
    /// Free-form release information.
    #[arg(long, default_value = "")]
    info: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = CatalogConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;

    match cli.command {
        Commands::Serve => command_serve(config).await,
        Commands::Config {
            command: ConfigCommand::Validate,
        } => {
            write_stdout_line("config ok")
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Service {
            command,
        } => command_service(open_runtime(config).await?, command).await,
        Commands::Version {
            command,
        } => command_version(open_runtime(config).await?, command).await,
    }
}

/// Opens the runtime on the blocking pool.
async fn open_runtime(config: CatalogConfig) -> CliResult<CatalogRuntime> {
    tokio::task::spawn_blocking(move || CatalogRuntime::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("init join failed: {err}")))?
        .map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config: CatalogConfig) -> CliResult<ExitCode> {
    let runtime = open_runtime(config).await?;
    write_stderr_line("service catalog started; press Ctrl-C to stop")
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    let stop = async {
        // A failed signal handler falls through to shutdown.
        let _ = tokio::signal::ctrl_c().await;
    };
    runtime
        .serve(stop)
        .await
        .map_err(|err| CliError::new(format!("view sync engine stopped: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Executes a `service` subcommand.
async fn command_service(runtime: CatalogRuntime, command: ServiceCommand) -> CliResult<ExitCode> {
    let ops = runtime.operations();
    match command {
        ServiceCommand::Add {
            name,
            description,
        } => {
            let service = blocking(ops, move |ops| ops.create_service(&name, &description)).await?;
            write_json(&service)?;
            flush(&runtime).await?;
        }
        ServiceCommand::Update {
            id,
            name,
            description,
        } => {
            let service = blocking(ops, move |ops| {
                ops.update_service(ServiceId::new(id), &name, &description)
            })
            .await?;
            write_json(&service)?;
            flush(&runtime).await?;
        }
        ServiceCommand::Remove {
            id,
        } => {
            blocking(ops, move |ops| ops.delete_service(ServiceId::new(id))).await?;
            write_json(&serde_json::json!({ "removed": id }))?;
            flush(&runtime).await?;
        }
        ServiceCommand::Get {
            id,
        } => {
            let service = blocking(ops, move |ops| ops.get_service(ServiceId::new(id))).await?;
            write_json(&service)?;
        }
        ServiceCommand::List(args) => {
            let request = FetchServicesRequest {
                page: PageRequest::new(
                    args.page,
                    runtime.config().pagination.page_size(args.page_size),
                    args.inverted,
                ),
                name_filter: NameFilter::contains(args.name),
                sort: args.sort_by.into(),
            };
            let page = blocking(ops, move |ops| ops.fetch_services(&request)).await?;
            write_json(&page)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes a `version` subcommand.
async fn command_version(runtime: CatalogRuntime, command: VersionCommand) -> CliResult<ExitCode> {
    let ops = runtime.operations();
    match command {
        VersionCommand::Add(args) => {
            let version = blocking(ops, move |ops| {
                ops.create_version(ServiceId::new(args.service_id), &VersionTag::new(args.tag), &args.info)
            })
            .await?;
            write_json(&version)?;
            flush(&runtime).await?;
        }
        VersionCommand::Update(args) => {
            let version = blocking(ops, move |ops| {
                ops.update_version(ServiceId::new(args.service_id), &VersionTag::new(args.tag), &args.info)
            })
            .await?;
            write_json(&version)?;
        }
        VersionCommand::Remove {
            service_id,
            tag,
        } => {
            let removed = tag.clone();
            blocking(ops, move |ops| {
                ops.delete_version(ServiceId::new(service_id), &VersionTag::new(tag))
            })
            .await?;
            write_json(&serde_json::json!({ "serviceId": service_id, "removed": removed }))?;
            flush(&runtime).await?;
        }
        VersionCommand::List {
            service_id,
            page,
            page_size,
        } => {
            let page_size = runtime.config().pagination.page_size(page_size);
            let versions = blocking(ops, move |ops| {
                ops.fetch_versions_inverted(ServiceId::new(service_id), page, page_size)
            })
            .await?;
            write_json(&versions)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs a catalog operation on the blocking pool.
async fn blocking<T, F>(ops: CatalogOperations, action: F) -> CliResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CatalogOperations) -> Result<T, CatalogError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || action(&ops))
        .await
        .map_err(|err| CliError::new(format!("catalog task failed: {err}")))?
        .map_err(CliError::from)
}

/// Refreshes the projection after a write so name-sorted listings see it.
///
/// The write has already succeeded; a failed refresh is reported on stderr
/// and left to the next engine start.
async fn flush(runtime: &CatalogRuntime) -> CliResult<()> {
    if let Err(err) = runtime.flush().await {
        write_stderr_line(&format!("warning: {err}"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as one JSON line on stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to encode output: {err}")))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
