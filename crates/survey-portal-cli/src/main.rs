// crates/survey-portal-cli/src/main.rs
// ============================================================================
// Module: Survey Portal CLI Entry Point
// Description: Command dispatcher for the access gate and survey tooling.
// Purpose: Run the gate service and check survey documents offline.
// Dependencies: clap, survey-portal-core, survey-portal-config, survey-portal-gate, tokio
// ============================================================================

//! ## Overview
//! The Survey Portal CLI starts the access gate HTTP service and runs the
//! survey definition checks against JSON documents on disk: structure
//! validation, visibility evaluation, response checks, structure
//! fingerprints, and deadline badges. Reports are written to stdout as
//! canonical JSON. Security posture: every input file is untrusted and read
//! under a hard size limit.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde::de::DeserializeOwned;
use survey_portal_config::PortalConfig;
use survey_portal_config::config_toml_example;
use survey_portal_core::AnswerIssue;
use survey_portal_core::Answers;
use survey_portal_core::DeadlineStatus;
use survey_portal_core::StructureIssue;
use survey_portal_core::Survey;
use survey_portal_core::SurveyId;
use survey_portal_core::SurveyResponse;
use survey_portal_core::SurveyStructure;
use survey_portal_core::VisibilityEvaluator;
use survey_portal_core::check_response;
use survey_portal_core::fingerprint_json;
use survey_portal_core::structure_issues;
use survey_portal_gate::GateServer;
use thiserror::Error;
use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a survey structure or survey record JSON input.
const MAX_STRUCTURE_BYTES: usize = 4 * 1024 * 1024;
/// Maximum size of an answers or response JSON input.
const MAX_ANSWERS_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "survey-portal", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the access gate HTTP service.
    Serve(ServeCommand),
    /// Survey definition utilities.
    Survey {
        /// Selected survey subcommand.
        #[command(subcommand)]
        command: SurveyCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to survey-portal.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Survey subcommands.
#[derive(Subcommand, Debug)]
enum SurveyCommand {
    /// Report structural issues in a survey structure.
    Validate(StructureArgs),
    /// Evaluate which questions and sections are visible for an answer set.
    Visibility(VisibilityCommand),
    /// Check a submitted response against its structure.
    CheckResponse(CheckResponseCommand),
    /// Print the canonical fingerprint of a survey structure.
    Fingerprint(StructureArgs),
    /// Classify a survey deadline relative to a calendar day.
    Deadline(DeadlineCommand),
}

/// Arguments naming a survey structure file.
#[derive(Args, Debug)]
struct StructureArgs {
    /// Path to the survey structure JSON.
    #[arg(long, value_name = "PATH")]
    structure: PathBuf,
}

/// Arguments for `survey visibility`.
#[derive(Args, Debug)]
struct VisibilityCommand {
    /// Path to the survey structure JSON.
    #[arg(long, value_name = "PATH")]
    structure: PathBuf,
    /// Path to the answers JSON object; omitted means no answers.
    #[arg(long, value_name = "PATH")]
    answers: Option<PathBuf>,
}

/// Arguments for `survey check-response`.
#[derive(Args, Debug)]
struct CheckResponseCommand {
    /// Path to the survey structure JSON.
    #[arg(long, value_name = "PATH")]
    structure: PathBuf,
    /// Path to the submitted response JSON.
    #[arg(long, value_name = "PATH")]
    response: PathBuf,
}

/// Arguments for `survey deadline`.
#[derive(Args, Debug)]
struct DeadlineCommand {
    /// Path to the survey record JSON.
    #[arg(long, value_name = "PATH")]
    survey: PathBuf,
    /// Calendar day to compare against (`YYYY-MM-DD`); defaults to today in UTC.
    #[arg(long, value_name = "DATE")]
    today: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
    /// Print the canonical example configuration.
    Example,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to survey-portal.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Collected issues report.
#[derive(Debug, Serialize)]
struct IssuesReport<T> {
    /// True when no issues were found.
    valid: bool,
    /// Issues in detection order.
    issues: Vec<T>,
}

impl<T> IssuesReport<T> {
    /// Wraps collected issues.
    fn new(issues: Vec<T>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    /// Exit code matching the report outcome.
    fn exit_code(&self) -> ExitCode {
        if self.valid { ExitCode::SUCCESS } else { ExitCode::FAILURE }
    }
}

/// Structure fingerprint report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintReport {
    /// Survey the structure belongs to.
    survey_id: SurveyId,
    /// Structure version.
    version: u32,
    /// Lowercase hex SHA-256 of the canonical JSON form.
    fingerprint: String,
}

/// Deadline badge report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeadlineReport {
    /// Survey identifier.
    survey_id: SurveyId,
    /// Day the deadline was compared against.
    today: String,
    /// Badge, absent when the survey has no deadline.
    deadline: Option<DeadlineStatus>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
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

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("survey-portal {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Survey {
            command,
        } => command_survey(command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = PortalConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let bind = config.server.bind.clone();
    let server = GateServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to initialize gate: {err}")))?;
    write_stderr_line(&format!("survey portal gate listening on {bind}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("gate server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Survey Commands
// ============================================================================

/// Dispatches survey subcommands.
fn command_survey(command: SurveyCommand) -> CliResult<ExitCode> {
    match command {
        SurveyCommand::Validate(args) => command_survey_validate(&args),
        SurveyCommand::Visibility(command) => command_survey_visibility(&command),
        SurveyCommand::CheckResponse(command) => command_survey_check_response(&command),
        SurveyCommand::Fingerprint(args) => command_survey_fingerprint(&args),
        SurveyCommand::Deadline(command) => command_survey_deadline(&command),
    }
}

/// Executes `survey validate`.
fn command_survey_validate(args: &StructureArgs) -> CliResult<ExitCode> {
    let structure: SurveyStructure =
        read_json(&args.structure, MAX_STRUCTURE_BYTES, "survey structure")?;
    let report = structure_report(&structure);
    write_json(&report)?;
    Ok(report.exit_code())
}

/// Executes `survey visibility`.
fn command_survey_visibility(command: &VisibilityCommand) -> CliResult<ExitCode> {
    let structure: SurveyStructure =
        read_json(&command.structure, MAX_STRUCTURE_BYTES, "survey structure")?;
    let answers: Answers = match &command.answers {
        Some(path) => read_json(path, MAX_ANSWERS_BYTES, "answers")?,
        None => Answers::default(),
    };
    let report = VisibilityEvaluator::new(&structure)
        .report(&answers)
        .map_err(|err| CliError::new(format!("visibility evaluation failed: {err}")))?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `survey check-response`.
fn command_survey_check_response(command: &CheckResponseCommand) -> CliResult<ExitCode> {
    let structure: SurveyStructure =
        read_json(&command.structure, MAX_STRUCTURE_BYTES, "survey structure")?;
    let response: SurveyResponse = read_json(&command.response, MAX_ANSWERS_BYTES, "response")?;
    let report = response_report(&structure, &response);
    write_json(&report)?;
    Ok(report.exit_code())
}

/// Executes `survey fingerprint`.
fn command_survey_fingerprint(args: &StructureArgs) -> CliResult<ExitCode> {
    let structure: SurveyStructure =
        read_json(&args.structure, MAX_STRUCTURE_BYTES, "survey structure")?;
    let report = fingerprint_report(&structure)?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `survey deadline`.
fn command_survey_deadline(command: &DeadlineCommand) -> CliResult<ExitCode> {
    let survey: Survey = read_json(&command.survey, MAX_STRUCTURE_BYTES, "survey")?;
    let today = match command.today.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => OffsetDateTime::now_utc().date(),
    };
    let report = DeadlineReport {
        survey_id: survey.id.clone(),
        today: today.to_string(),
        deadline: survey.deadline_status(today),
    };
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the structural issues report.
fn structure_report(structure: &SurveyStructure) -> IssuesReport<StructureIssue> {
    IssuesReport::new(structure_issues(structure))
}

/// Builds the response check report.
fn response_report(
    structure: &SurveyStructure,
    response: &SurveyResponse,
) -> IssuesReport<AnswerIssue> {
    match check_response(structure, response) {
        Ok(()) => IssuesReport::new(Vec::new()),
        Err(errors) => IssuesReport::new(errors.0),
    }
}

/// Builds the fingerprint report.
fn fingerprint_report(structure: &SurveyStructure) -> CliResult<FingerprintReport> {
    let fingerprint = fingerprint_json(structure)
        .map_err(|err| CliError::new(format!("failed to fingerprint structure: {err}")))?;
    Ok(FingerprintReport {
        survey_id: structure.survey_id.clone(),
        version: structure.version,
        fingerprint: fingerprint.as_str().to_string(),
    })
}

/// Parses a `YYYY-MM-DD` calendar day.
fn parse_day(raw: &str) -> CliResult<Date> {
    Date::parse(raw.trim(), &Iso8601::DATE)
        .map_err(|err| CliError::new(format!("invalid date {raw}: {err}")))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = PortalConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_bytes(config_toml_example().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
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

    let mut limited = file.take(limit.saturating_add(1));
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

/// Reads and decodes a bounded JSON document.
fn read_json<T: DeserializeOwned>(path: &Path, max_bytes: usize, kind: &str) -> CliResult<T> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{kind} {} exceeds size limit ({size} > {limit} bytes)",
            path.display()
        )),
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid {kind} {}: {err}", path.display())))
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

/// Writes canonical JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
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
