//! Lights CLI - Command-line interface for circadian-lights
//!
//! Commands:
//! - sample: Sample a configured light schedule (NDJSON or JSON)
//! - describe: Summarize a schedule's window and segments
//! - validate: Check that a configuration builds
//! - doctor: Diagnose configuration and environment
//! - schema: Print the configuration schema

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use circadian_lights::light::DEFAULT_SAMPLE_COUNT;
use circadian_lights::{
    ConfigError, DomainError, Light, LightConfig, LightSample, LightSummary, LIGHTS_VERSION,
    PRODUCER_NAME,
};

/// Lights - Light exposure schedules for circadian rhythm models
#[derive(Parser)]
#[command(name = "lights")]
#[command(version = LIGHTS_VERSION)]
#[command(about = "Build and sample circadian light schedules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a light schedule at evenly spaced times
    Sample {
        /// Configuration file path (use - for stdin)
        #[arg(short, long)]
        config: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// First sample time in hours (defaults to the schedule start)
        #[arg(long, allow_negative_numbers = true)]
        start: Option<f64>,

        /// Last sample time in hours (defaults to the schedule end)
        #[arg(long, allow_negative_numbers = true)]
        end: Option<f64>,

        /// Number of samples
        #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        samples: usize,

        /// Wrap sample times onto this period (hours)
        #[arg(long)]
        repeat_period: Option<f64>,

        /// Wall-clock instant of hour 0 (RFC 3339, e.g. 2024-01-15T00:00:00Z)
        #[arg(long)]
        anchor: Option<String>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Summarize a light schedule
    Describe {
        /// Configuration file path (use - for stdin)
        #[arg(short, long)]
        config: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a configuration builds a valid schedule
    Validate {
        /// Configuration file path (use - for stdin)
        #[arg(short, long)]
        config: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check this configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration schema
    Schema {
        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LightsCliError> {
    match cli.command {
        Commands::Sample {
            config,
            output,
            start,
            end,
            samples,
            repeat_period,
            anchor,
            output_format,
        } => cmd_sample(
            &config,
            &output,
            SampleWindow {
                start,
                end,
                samples,
                repeat_period,
            },
            anchor.as_deref(),
            output_format,
        ),

        Commands::Describe { config, json } => cmd_describe(&config, json),

        Commands::Validate { config, json } => cmd_validate(&config, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { json_schema } => cmd_schema(json_schema),
    }
}

struct SampleWindow {
    start: Option<f64>,
    end: Option<f64>,
    samples: usize,
    repeat_period: Option<f64>,
}

fn cmd_sample(
    config: &Path,
    output: &Path,
    window: SampleWindow,
    anchor: Option<&str>,
    output_format: OutputFormat,
) -> Result<(), LightsCliError> {
    let anchor = anchor.map(parse_anchor).transpose()?;
    let light = load_light(config)?;

    let samples = light.sample(
        window.start,
        window.end,
        window.repeat_period,
        window.samples,
    )?;
    info!(samples = samples.len(), "sampled light schedule");

    let records = samples.records(anchor)?;
    let output_data = format_output(&records, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_describe(config: &Path, json: bool) -> Result<(), LightsCliError> {
    let light = load_light(config)?;
    let summary = LightSummary::from(&light);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Light Schedule");
    println!("==============");
    println!("Start:    {} h", summary.start);
    println!("Duration: {} h", summary.duration);
    println!("End:      {} h", summary.end);
    println!("Default:  {} lux", summary.default_value);
    println!("\nSegments ({}):", summary.segments.len());

    for segment in &summary.segments {
        let open = if segment.start_inclusive { '[' } else { '(' };
        let close = if segment.end_inclusive { ']' } else { ')' };
        let start = segment
            .start
            .map_or_else(|| "-inf".to_string(), |s| s.to_string());
        let end = segment
            .end
            .map_or_else(|| "+inf".to_string(), |e| e.to_string());
        let shape = if segment.components == 0 {
            format!("{} lux", segment.offset)
        } else {
            format!("{} lux + {} function(s)", segment.offset, segment.components)
        };
        println!("  {}{}, {}{}  {}", open, start, end, close, shape);
    }

    Ok(())
}

fn cmd_validate(config: &Path, json: bool) -> Result<(), LightsCliError> {
    let input_data = read_input(config)?;

    let (protocol, error) = match LightConfig::from_json(&input_data) {
        Ok(config) => (
            Some(config.protocol.name().to_string()),
            config.build().err().map(|e| e.to_string()),
        ),
        Err(e) => (None, Some(e.to_string())),
    };

    let report = ValidationReport {
        valid: error.is_none(),
        protocol,
        error,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!(
            "Protocol: {}",
            report.protocol.as_deref().unwrap_or("unknown")
        );
        println!("Valid:    {}", report.valid);

        if let Some(error) = &report.error {
            println!("\nError: {}", error);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(LightsCliError::ValidationFailed)
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), LightsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "lights_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("circadian-lights version {}", LIGHTS_VERSION),
    });

    if let Some(config_path) = config {
        checks.push(check_config(config_path));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --config with a file path)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--config - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: LIGHTS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Lights Doctor Report");
        println!("====================");
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

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(LightsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_config(path: &Path) -> DoctorCheck {
    let name = "config".to_string();

    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: "Configuration file does not exist".to_string(),
        };
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return DoctorCheck {
                name,
                status: CheckStatus::Error,
                message: format!("Cannot read configuration file: {}", e),
            }
        }
    };

    match LightConfig::from_json(&content).and_then(|c| c.build().map_err(ConfigError::from)) {
        Ok(light) => DoctorCheck {
            name,
            status: CheckStatus::Ok,
            message: format!(
                "Configuration valid ({} h starting at {} h, {} segments)",
                light.duration(),
                light.start(),
                light.segments().len()
            ),
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("Invalid configuration: {}", e),
        },
    }
}

fn cmd_schema(json_schema: bool) -> Result<(), LightsCliError> {
    if json_schema {
        println!("{}", get_config_json_schema());
        return Ok(());
    }

    println!("Configuration Schema");
    println!();
    println!("A JSON object tagged by \"protocol\"; omitted parameters use the defaults shown.");
    println!();
    println!("1. regular - A single 24-hour day");
    println!("   - lux (150), lights_on (8), lights_off (16)");
    println!();
    println!("2. shift_work - Night-shift work days followed by days off");
    println!("   - lux (150), days_on (3), days_off (2)");
    println!();
    println!("3. slam_shift - Abrupt shift of the light schedule");
    println!("   - lux (150), shift (8), before_days (10), after_days (10), starting_lights_on (8)");
    println!();
    println!("4. social_jetlag - Regular days followed by delayed days");
    println!("   - lux (150), num_regular_days (5), num_jetlag_days (2), hours_delayed (2),");
    println!("     regular_days_lights_on (7)");
    println!();
    println!("Optional \"pulses\": [{{ start, end, intensity (150), steepness (30), repeat (false) }}]");
    println!("are overlaid on the protocol in order.");

    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, LightsCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn load_light(path: &Path) -> Result<Light, LightsCliError> {
    let config = LightConfig::from_json(&read_input(path)?)?;
    debug!(protocol = config.protocol.name(), "loaded configuration");
    Ok(config.build()?)
}

fn parse_anchor(anchor: &str) -> Result<DateTime<Utc>, LightsCliError> {
    DateTime::parse_from_rfc3339(anchor)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| LightsCliError::InvalidAnchor(format!("{}: {}", anchor, e)))
}

fn format_output(
    records: &[LightSample],
    format: &OutputFormat,
) -> Result<String, LightsCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn get_config_json_schema() -> String {
    let lux = serde_json::json!({ "type": "number", "minimum": 0, "default": 150 });
    let days =
        |default: u32| serde_json::json!({ "type": "integer", "minimum": 0, "default": default });
    let number = |default: f64| serde_json::json!({ "type": "number", "default": default });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "circadian-lights configuration",
        "type": "object",
        "required": ["protocol"],
        "properties": {
            "pulses": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["start", "end"],
                    "properties": {
                        "start": { "type": "number" },
                        "end": { "type": "number" },
                        "intensity": lux,
                        "steepness": number(30.0),
                        "repeat": { "type": "boolean", "default": false }
                    }
                }
            }
        },
        "oneOf": [
            {
                "properties": {
                    "protocol": { "const": "regular" },
                    "lux": lux,
                    "lights_on": number(8.0),
                    "lights_off": number(16.0)
                }
            },
            {
                "properties": {
                    "protocol": { "const": "shift_work" },
                    "lux": lux,
                    "days_on": days(3),
                    "days_off": days(2)
                }
            },
            {
                "properties": {
                    "protocol": { "const": "slam_shift" },
                    "lux": lux,
                    "shift": number(8.0),
                    "before_days": days(10),
                    "after_days": days(10),
                    "starting_lights_on": number(8.0)
                }
            },
            {
                "properties": {
                    "protocol": { "const": "social_jetlag" },
                    "lux": lux,
                    "num_regular_days": days(5),
                    "num_jetlag_days": days(2),
                    "hours_delayed": number(2.0),
                    "regular_days_lights_on": number(7.0)
                }
            }
        ]
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum LightsCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Domain(DomainError),
    InvalidAnchor(String),
    ValidationFailed,
    DoctorFailed,
}

impl From<io::Error> for LightsCliError {
    fn from(e: io::Error) -> Self {
        LightsCliError::Io(e)
    }
}

impl From<serde_json::Error> for LightsCliError {
    fn from(e: serde_json::Error) -> Self {
        LightsCliError::Json(e)
    }
}

impl From<DomainError> for LightsCliError {
    fn from(e: DomainError) -> Self {
        LightsCliError::Domain(e)
    }
}

impl From<ConfigError> for LightsCliError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Json(e) => LightsCliError::Json(e),
            ConfigError::Domain(e) => LightsCliError::Domain(e),
        }
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LightsCliError> for CliError {
    fn from(e: LightsCliError) -> Self {
        match e {
            LightsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LightsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'lights schema' for the configuration format".to_string()),
            },
            LightsCliError::Domain(e) => CliError {
                code: "DOMAIN_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'lights validate' for details".to_string()),
            },
            LightsCliError::InvalidAnchor(msg) => CliError {
                code: "INVALID_ANCHOR".to_string(),
                message: msg,
                hint: Some("Use an RFC 3339 timestamp such as 2024-01-15T00:00:00Z".to_string()),
            },
            LightsCliError::ValidationFailed => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: "Configuration does not build a valid schedule".to_string(),
                hint: Some("Fix the reported error and retry".to_string()),
            },
            LightsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    valid: bool,
    protocol: Option<String>,
    error: Option<String>,
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
