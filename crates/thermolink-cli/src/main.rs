use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use thermolink_core::{
    DecodeError, DecodedRecord, Envelope, IngestError, TemperatureSample, decode_envelope,
};

const BUILD_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("THERMOLINK_BUILD_COMMIT"),
    " ",
    env!("THERMOLINK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "thermolink")]
#[command(version = BUILD_VERSION)]
#[command(
    about = "Offline decoder for temperature-sensor telemetry envelopes.",
    long_about = None,
    after_help = "Examples:\n  thermolink envelope decode envelope.json -o record.json\n  thermolink envelope decode envelope.json --stdout --pretty\n  thermolink envelope decode envelope.json --stdout --list-samples"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on transport envelopes (offline inspection).
    Envelope {
        #[command(subcommand)]
        command: EnvelopeCommands,
    },
}

#[derive(Subcommand, Debug)]
enum EnvelopeCommands {
    /// Decode an envelope JSON file and emit the record JSON.
    #[command(
        after_help = "Examples:\n  thermolink envelope decode envelope.json -o record.json\n  thermolink envelope decode envelope.json --stdout --list-samples"
    )]
    Decode {
        /// Path to an envelope .json file
        input: PathBuf,

        /// Output record path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        record: Option<PathBuf>,

        /// Write JSON record to stdout
        #[arg(long, conflicts_with = "record")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// List decoded samples with RFC3339 timestamps
        #[arg(long)]
        list_samples: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Envelope { command } => match command {
            EnvelopeCommands::Decode {
                input,
                record,
                stdout,
                pretty,
                compact,
                quiet,
                list_samples,
            } => cmd_envelope_decode(input, record, stdout, pretty, compact, quiet, list_samples),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_envelope_decode(
    input: PathBuf,
    record: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    list_samples: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;

    let record = if stdout {
        None
    } else {
        Some(record.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--record or --stdout".to_string()),
            )
        })?)
    };

    let envelope_json = fs::read_to_string(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let envelope: Envelope = serde_json::from_str(&envelope_json).map_err(|err| {
        CliError::new(
            format!("invalid envelope JSON in {}: {}", resolved_input.display(), err),
            Some("expected {\"data\": \"<base64>\", \"attributes\": {\"device\": ..., \"time\": ...}}".to_string()),
        )
    })?;

    let decoded = decode_envelope(&envelope).map_err(describe_ingest_error)?;
    let json = serialize_record(&decoded, pretty, compact)?;

    if stdout {
        println!("{}", json);
        if list_samples && !quiet {
            print_samples(&decoded);
        }
        return Ok(());
    }

    let record = record.expect("record required when not using stdout");
    if let Some(parent) = record.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&record, json)
        .with_context(|| format!("Failed to write record: {}", record.display()))?;

    if list_samples && !quiet {
        print_samples(&decoded);
    }
    if !quiet {
        eprintln!("OK: record written -> {}", record.display());
    }
    Ok(())
}

fn describe_ingest_error(err: IngestError) -> CliError {
    let hint = match &err {
        IngestError::Envelope(_) => "check the envelope's data and attributes fields",
        IngestError::Decode(DecodeError::UnsupportedMode { .. }) => {
            "supported frame modes are 00, 10, 01, 02, 03"
        }
        IngestError::Decode(DecodeError::MalformedFrame(_)) => {
            "the frame is undersized or contains non-hex characters"
        }
        IngestError::Publish(_) => "the record decoded but could not be queued",
    };
    CliError::new(err.to_string(), Some(hint.to_string()))
}

fn serialize_record(
    record: &DecodedRecord,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(record)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(record)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_samples(record: &DecodedRecord) {
    match record {
        DecodedRecord::TemperatureBatch { samples } => {
            eprintln!("Decoded samples:");
            for sample in samples {
                eprintln!("  {}", format_sample(sample));
            }
        }
        DecodedRecord::AggregateBatch { mean, max, min } => {
            eprintln!("Decoded aggregates:");
            eprintln!("  mean {}", format_sample(mean));
            eprintln!("  max  {}", format_sample(max));
            eprintln!("  min  {}", format_sample(min));
        }
        DecodedRecord::AlarmEvent { active } => {
            eprintln!("Alarm: {}", if *active { "active" } else { "inactive" });
        }
        DecodedRecord::SystemStatus { battery_voltage } => {
            eprintln!("Battery: {:.1} V", battery_voltage);
        }
    }
}

fn format_sample(sample: &TemperatureSample) -> String {
    format!(
        "{} {} {:.1}",
        ts_to_rfc3339(sample.timestamp),
        sample.device_id,
        sample.temperature
    )
}

fn ts_to_rfc3339(ts: i64) -> String {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use an envelope .json file".to_string()),
        ));
    }
    let meta = fs::metadata(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use an envelope .json file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected an envelope .json file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return Ok(input.clone());
    }

    let mut matches: Vec<PathBuf> = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected an envelope .json file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::new(
            format!("multiple files match pattern '{}' ({} matches)", pattern, n),
            Some("pass a single envelope file, or run once per file".to_string()),
        )),
    }
}
