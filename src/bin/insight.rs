//! Insight CLI - Command-line interface for calc-insight
//!
//! Commands:
//! - analyze: Compute the behavior profile of one session payload
//! - ingest: Analyse one payload and persist it into a store directory
//! - run: Ingest newline-delimited payloads from stdin (streaming mode)
//! - schema: Print the session sheet columns for a domain
//! - doctor: Diagnose configuration and store health

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use calc_insight::config::PRESET_NAMES;
use calc_insight::store::{RowStore, SessionLayout};
use calc_insight::{
    analyze_session_json, CsvStore, DomainConfig, IngestEndpoint, InsightError, INSIGHT_VERSION,
    PRODUCER_NAME,
};

/// Insight - Behavioral session analytics for web-based financial calculators
#[derive(Parser)]
#[command(name = "insight")]
#[command(author = "eco2Veritas Engineering")]
#[command(version = INSIGHT_VERSION)]
#[command(about = "Turn calculator session payloads into behavior profiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DomainArgs {
    /// Built-in domain preset
    #[arg(long, default_value = "savings")]
    domain: String,

    /// Domain configuration file (overrides --domain)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the behavior profile of one session payload
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        domain: DomainArgs,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Analyse one payload (raw JSON or form-encoded) and persist it
    Ingest {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Store directory holding sessions.csv and users.csv
        #[arg(long)]
        store: PathBuf,

        #[command(flatten)]
        domain: DomainArgs,
    },

    /// Ingest newline-delimited payloads from stdin (streaming mode)
    Run {
        /// Store directory holding sessions.csv and users.csv
        #[arg(long)]
        store: PathBuf,

        #[command(flatten)]
        domain: DomainArgs,

        /// Buffer output instead of flushing after each record
        #[arg(long)]
        no_flush: bool,
    },

    /// Print the session sheet columns for a domain
    Schema {
        #[command(flatten)]
        domain: DomainArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and store health
    Doctor {
        #[command(flatten)]
        domain: DomainArgs,

        /// Check a store directory
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), InsightCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            domain,
            output_format,
        } => cmd_analyze(&input, &domain, output_format),

        Commands::Ingest {
            input,
            store,
            domain,
        } => cmd_ingest(&input, &store, &domain),

        Commands::Run {
            store,
            domain,
            no_flush,
        } => cmd_run(&store, &domain, !no_flush),

        Commands::Schema { domain, json } => cmd_schema(&domain, json),

        Commands::Doctor { domain, store, json } => cmd_doctor(&domain, store.as_deref(), json),
    }
}

fn cmd_analyze(
    input: &Path,
    domain: &DomainArgs,
    output_format: OutputFormat,
) -> Result<(), InsightCliError> {
    let config = load_domain(domain)?;
    let payload = read_input(input)?;
    let profile = analyze_session_json(&payload, &config)?;

    let output = match output_format {
        OutputFormat::Json => serde_json::to_string(&profile)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&profile)?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_ingest(input: &Path, store: &Path, domain: &DomainArgs) -> Result<(), InsightCliError> {
    let config = load_domain(domain)?;
    let body = read_input(input)?;
    let mut endpoint = IngestEndpoint::new(config, CsvStore::open(store)?);

    let response = endpoint.handle(&body);
    println!("{}", response.to_json()?);

    match response.error {
        Some(message) => Err(InsightCliError::Rejected(message)),
        None => Ok(()),
    }
}

fn cmd_run(store: &Path, domain: &DomainArgs, flush: bool) -> Result<(), InsightCliError> {
    let config = load_domain(domain)?;
    let mut endpoint = IngestEndpoint::new(config, CsvStore::open(store)?);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut rejected = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let response = endpoint.handle(trimmed);
        if !response.success {
            rejected += 1;
        }

        writeln!(stdout, "{}", response.to_json()?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    tracing::info!(
        sessions = endpoint.analyzer().session_count(),
        rejected,
        "stream finished"
    );

    Ok(())
}

fn cmd_schema(domain: &DomainArgs, json: bool) -> Result<(), InsightCliError> {
    let config = load_domain(domain)?;
    let layout = SessionLayout::new(&config);

    if json {
        let report = SchemaReport {
            domain: config.name.clone(),
            title: config.title.clone(),
            columns: layout.headers().to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Session sheet: {} ({})", config.title, config.name);
        println!();
        for (index, header) in layout.headers().iter().enumerate() {
            println!("{:>3}. {}", index + 1, header);
        }
    }

    Ok(())
}

fn cmd_doctor(domain: &DomainArgs, store: Option<&Path>, json: bool) -> Result<(), InsightCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "insight_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("calc-insight version {}", INSIGHT_VERSION),
    });

    // Check the domain configuration
    let config = match load_domain(domain) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "domain".to_string(),
                status: CheckStatus::Ok,
                message: format!("Domain '{}' loaded ({})", config.name, config.title),
            });
            Some(config)
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "domain".to_string(),
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            });
            None
        }
    };

    // Check the store directory if provided
    if let Some(dir) = store {
        checks.push(check_store(dir, config.as_ref()));
    }

    // Check stdin is available (for streaming mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: INSIGHT_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Insight Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(InsightCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn load_domain(args: &DomainArgs) -> Result<DomainConfig, InsightCliError> {
    match &args.config {
        Some(path) => Ok(DomainConfig::from_file(path)?),
        None => Ok(DomainConfig::preset(&args.domain)?),
    }
}

fn read_input(input: &Path) -> Result<String, InsightCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn check_store(dir: &Path, config: Option<&DomainConfig>) -> DoctorCheck {
    if !dir.exists() {
        return DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Warning,
            message: "Store directory does not exist (created on first ingest)".to_string(),
        };
    }

    let store = match CsvStore::open(dir) {
        Ok(store) => store,
        Err(e) => {
            return DoctorCheck {
                name: "store".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot open store: {}", e),
            }
        }
    };

    let header = match store.session_header() {
        Ok(header) => header,
        Err(e) => {
            return DoctorCheck {
                name: "store".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read session sheet: {}", e),
            }
        }
    };

    let Some(header) = header else {
        return DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Ok,
            message: "Session sheet is empty (header written on first ingest)".to_string(),
        };
    };

    if let Some(config) = config {
        if header.as_slice() != SessionLayout::new(config).headers() {
            return DoctorCheck {
                name: "store".to_string(),
                status: CheckStatus::Error,
                message: format!("Session sheet header does not match domain '{}'", config.name),
            };
        }
    }

    let rows = store.session_row_count().unwrap_or(0);
    let users = store.load_users().map(|users| users.len()).unwrap_or(0);
    DoctorCheck {
        name: "store".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} sessions, {} users", rows, users),
    }
}

// Error types

#[derive(Debug)]
enum InsightCliError {
    Io(io::Error),
    Insight(InsightError),
    Json(serde_json::Error),
    Rejected(String),
    DoctorFailed,
}

impl From<io::Error> for InsightCliError {
    fn from(e: io::Error) -> Self {
        InsightCliError::Io(e)
    }
}

impl From<InsightError> for InsightCliError {
    fn from(e: InsightError) -> Self {
        InsightCliError::Insight(e)
    }
}

impl From<serde_json::Error> for InsightCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightCliError> for CliError {
    fn from(e: InsightCliError) -> Self {
        match e {
            InsightCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightCliError::Insight(e) => {
                let hint = match &e {
                    InsightError::ConfigError(_) => {
                        format!("Use one of: {}, or pass --config", PRESET_NAMES.join(", "))
                    }
                    InsightError::StoreError(_) | InsightError::Csv(_) => {
                        "Run 'insight doctor --store <dir>' for details".to_string()
                    }
                    _ => "Ensure input is a calculator session payload".to_string(),
                };
                CliError {
                    code: insight_error_code(&e).to_string(),
                    message: e.to_string(),
                    hint: Some(hint),
                }
            }
            InsightCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightCliError::Rejected(msg) => CliError {
                code: "REJECTED".to_string(),
                message: msg,
                hint: Some("The payload was not recorded".to_string()),
            },
            InsightCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

fn insight_error_code(e: &InsightError) -> &'static str {
    match e {
        InsightError::ParseError(_) | InsightError::JsonError(_) => "PARSE_ERROR",
        InsightError::MissingField(_) | InsightError::InvalidPayload(_) => "INVALID_PAYLOAD",
        InsightError::ConfigError(_) => "CONFIG_ERROR",
        InsightError::StoreError(_) | InsightError::Csv(_) => "STORE_ERROR",
        InsightError::Io(_) => "IO_ERROR",
    }
}

// Report types

#[derive(serde::Serialize)]
struct SchemaReport {
    domain: String,
    title: String,
    columns: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
