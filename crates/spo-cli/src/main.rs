// crates/spo-cli/src/main.rs
// ============================================================================
// Module: SPO CLI Entry Point
// Description: Command dispatcher for SharePoint Online tenant workflows.
// Purpose: Provide a safe, localized CLI for tenant storage entity queries.
// Dependencies: clap, serde, spo-core, thiserror, tokio, toml.
// ============================================================================

//! ## Overview
//! The SPO CLI lists tenant-wide storage entities persisted in the tenant app
//! catalog of a SharePoint Online site. All user-facing strings are routed
//! through the i18n catalog to prepare for future localization, with one
//! deliberate exception: auth provider failures are surfaced verbatim.
//! Security posture: CLI inputs, stored connection files, and server
//! responses are untrusted and must be validated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod auth;
pub(crate) mod i18n;
pub(crate) mod spo_client;
#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Deserialize;
use spo_core::AppCatalogUrl;
use spo_core::AppCatalogUrlError;
use spo_core::PropertyIndexOutcome;
use spo_core::SiteConnection;
use spo_core::SiteUrl;
use spo_core::TenantPropertyIndex;
use spo_core::decode_property_index;
use thiserror::Error;

use crate::auth::AccessTokenProvider;
use crate::auth::StoredAccessTokenProvider;
use crate::i18n::Locale;
use crate::i18n::set_locale;
use crate::spo_client::SpoClient;
use crate::spo_client::SpoClientConfig;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a stored connection file.
const MAX_CONNECTION_FILE_BYTES: usize = 64 * 1024;
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "SPO_LANG";
/// Environment variable for stored connection path selection.
const CONNECTION_ENV: &str = "SPO_CONNECTION";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "spo", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `SPO_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Tenant storage entity utilities.
    Storageentity {
        /// Selected storage entity subcommand.
        #[command(subcommand)]
        command: StorageEntityCommand,
    },
}

/// Storage entity subcommands.
#[derive(Subcommand, Debug)]
enum StorageEntityCommand {
    /// List tenant-wide storage entities from the app catalog.
    List(StorageEntityListCommand),
}

/// Arguments for `storageentity list`.
#[derive(Args, Debug)]
struct StorageEntityListCommand {
    /// Tenant app catalog site URL (e.g., <https://contoso.sharepoint.com/sites/appcatalog>).
    #[arg(long = "app-catalog-url", value_name = "URL")]
    app_catalog_url: Option<String>,
    /// Path to the stored connection file (defaults to spo.toml or env override).
    #[arg(long, value_name = "PATH")]
    connection: Option<PathBuf>,
    /// Request timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 30_000)]
    timeout_ms: u64,
    /// Emit progress detail to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
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
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Storageentity {
            command,
        } => command_storageentity(command).await,
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Storage Entity Commands
// ============================================================================

/// Dispatches storage entity subcommands.
async fn command_storageentity(command: StorageEntityCommand) -> CliResult<ExitCode> {
    match command {
        StorageEntityCommand::List(command) => command_storageentity_list(command).await,
    }
}

/// Executes the `storageentity list` command.
async fn command_storageentity_list(command: StorageEntityListCommand) -> CliResult<ExitCode> {
    let app_catalog =
        AppCatalogUrl::parse(command.app_catalog_url.as_deref()).map_err(|err| match err {
            AppCatalogUrlError::MissingValue => CliError::new(t!("storageentity.list.missing_url")),
            AppCatalogUrlError::NotAppCatalog {
                url,
            } => CliError::new(t!("storageentity.list.invalid_url", url = url)),
        })?;

    let connection_path = resolve_connection_path(command.connection.as_deref());
    let stored = load_stored_connection(&connection_path)?;
    let Some(stored) = stored.filter(|stored| stored.site.connected) else {
        write_stderr_line(&t!("connection.connect_first"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };

    if command.verbose {
        write_stderr_line(&t!("storageentity.list.retrieving", url = app_catalog))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    let provider = StoredAccessTokenProvider::new(stored.access_token, stored.token_expires_on);
    let outcome = resolve_property_index(
        &stored.site.url,
        &provider,
        Duration::from_millis(command.timeout_ms),
    )
    .await?;

    match outcome {
        PropertyIndexOutcome::NoEntries => {
            write_stdout_line(&t!("storageentity.list.none_found"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        PropertyIndexOutcome::Entries(index) => {
            render_entries(&index)?;
        }
        PropertyIndexOutcome::DecodeFailure(reason) => {
            return Err(CliError::new(reason));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Retrieves and decodes the tenant property index for the connected site.
///
/// Token acquisition failures are surfaced verbatim; fetch failures are
/// wrapped in the localized retrieval message.
async fn resolve_property_index(
    site: &SiteUrl,
    provider: &dyn AccessTokenProvider,
    timeout: Duration,
) -> CliResult<PropertyIndexOutcome> {
    let token =
        provider.access_token(site).await.map_err(|err| CliError::new(err.to_string()))?;
    let client = SpoClient::new(SpoClientConfig {
        site_url: site.clone(),
        bearer_token: token.into_inner(),
        timeout,
    })
    .map_err(|err| CliError::new(t!("storageentity.list.fetch_failed", error = err)))?;
    let raw = client
        .fetch_property_index()
        .await
        .map_err(|err| CliError::new(t!("storageentity.list.fetch_failed", error = err)))?;
    Ok(decode_property_index(raw.as_deref()))
}

/// Formats decoded storage entities as labeled blocks in declaration order.
///
/// Absent optional fields render as the localized "not set" placeholder;
/// the decoded model itself keeps them optional.
fn format_entries(index: &TenantPropertyIndex) -> String {
    let not_set = t!("storageentity.list.not_set");
    let mut output = String::new();
    for (name, entity) in index.iter() {
        output.push_str(&t!("storageentity.list.entry.key", name = name));
        output.push('\n');
        output.push_str(&t!("storageentity.list.entry.value", value = entity.value));
        output.push('\n');
        let description = entity.description.as_deref().unwrap_or(not_set.as_str());
        output.push_str(&t!("storageentity.list.entry.description", description = description));
        output.push('\n');
        let comment = entity.comment.as_deref().unwrap_or(not_set.as_str());
        output.push_str(&t!("storageentity.list.entry.comment", comment = comment));
        output.push('\n');
        output.push('\n');
    }
    output
}

/// Renders decoded storage entities to stdout in declaration order.
fn render_entries(index: &TenantPropertyIndex) -> CliResult<()> {
    write_stdout_bytes(format_entries(index).as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Connection Profile
// ============================================================================

/// Stored connection state loaded from the connection file.
#[derive(Debug, Clone)]
struct StoredConnection {
    /// Connected site context.
    site: SiteConnection,
    /// Bearer token persisted for the connected site.
    access_token: Option<String>,
    /// RFC 3339 expiry timestamp persisted for the stored token.
    token_expires_on: Option<String>,
}

/// Connection file container parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
struct ConnectionProfile {
    /// Optional connection section describing the signed-in site.
    connection: Option<ConnectionSection>,
}

/// Connection section parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
struct ConnectionSection {
    /// Connected site URL.
    url: String,
    /// Whether the profile represents an active sign-in.
    #[serde(default)]
    connected: bool,
    /// Optional bearer token for the connected site.
    access_token: Option<String>,
    /// Optional RFC 3339 expiry timestamp for the stored token.
    token_expires_on: Option<String>,
}

/// Resolves the path for stored connection loading.
fn resolve_connection_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = std::env::var(CONNECTION_ENV) {
        return PathBuf::from(env_path);
    }
    PathBuf::from("spo.toml")
}

/// Loads the stored connection profile, when one exists.
///
/// A missing file is the signed-out state, not an error.
fn load_stored_connection(path: &Path) -> CliResult<Option<StoredConnection>> {
    let bytes = match read_bytes_with_limit(path, MAX_CONNECTION_FILE_BYTES) {
        Ok(bytes) => bytes,
        Err(ReadLimitError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(ReadLimitError::Io(err)) => {
            return Err(CliError::new(t!(
                "connection.read_failed",
                path = path.display(),
                error = err
            )));
        }
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            return Err(CliError::new(t!(
                "connection.read_too_large",
                path = path.display(),
                size = size,
                limit = limit
            )));
        }
    };
    let content = std::str::from_utf8(&bytes).map_err(|err| {
        CliError::new(t!("connection.parse_failed", path = path.display(), error = err))
    })?;
    let parsed: ConnectionProfile = toml::from_str(content).map_err(|err| {
        CliError::new(t!("connection.parse_failed", path = path.display(), error = err))
    })?;
    let Some(section) = parsed.connection else {
        return Ok(None);
    };
    Ok(Some(StoredConnection {
        site: SiteConnection {
            url: SiteUrl::new(section.url),
            connected: section.connected,
        },
        access_token: section.access_token,
        token_expires_on: section.token_expires_on,
    }))
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Locale Helpers
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Converts CLI language selections into locales.
impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits a localized error line to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&t!("main.error", message = message));
    ExitCode::FAILURE
}
