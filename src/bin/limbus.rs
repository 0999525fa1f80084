//! Limbus CLI - command-line front end for the Limbus analysis core
//!
//! Commands:
//! - analyze: process recorded detector frames into frame payloads (batch)
//! - run: process streaming frames from stdin (one JSON frame per line)
//! - validate: check recorded frames against the input schema

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

use limbus_core::encoder::FrameEncoder;
use limbus_core::pipeline::AnalysisEngine;
use limbus_core::schema::RawFrame;
use limbus_core::types::FramePayload;
use limbus_core::{AnalysisConfig, AnalysisError, CORE_VERSION};

/// Limbus - motion-to-emotion analysis for hand-driven particle visuals
#[derive(Parser)]
#[command(name = "limbus")]
#[command(version = CORE_VERSION)]
#[command(about = "Analyze hand-tracking frames into emotion and interaction state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process recorded frames into frame payloads (batch mode)
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Process streaming frames from stdin (one JSON frame per line)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Flush output after each frame
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate recorded frames against the input schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one payload per line)
    Ndjson,
    /// JSON array of payloads
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Debug, Error)]
enum LimbusCliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Core(#[from] AnalysisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no frames in input")]
    NoFrames,

    #[error("{0} invalid frame(s)")]
    ValidationFailed(usize),
}

#[derive(Serialize)]
struct ValidationReport {
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LimbusCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_analyze(&input, &output, input_format, output_format, config.as_deref()),

        Commands::Run {
            output_format,
            config,
            flush,
        } => cmd_run(output_format, config.as_deref(), flush),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),
    }
}

fn cmd_analyze(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), LimbusCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, &input_format)?;

    if frames.is_empty() {
        return Err(LimbusCliError::NoFrames);
    }

    let mut engine = AnalysisEngine::with_config(load_config(config)?);
    let encoder = FrameEncoder::new();

    let mut payloads: Vec<FramePayload> = Vec::new();
    for frame in &frames {
        frame.validate()?;
        let analysis = engine.update(frame);
        payloads.push(encoder.encode(&analysis));
    }

    let output_data = format_output(&payloads, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    config: Option<&Path>,
    flush: bool,
) -> Result<(), LimbusCliError> {
    if atty::is(atty::Stream::Stdin) {
        eprintln!("limbus run: reading frames from stdin (one JSON frame per line)");
    }

    let mut engine = AnalysisEngine::with_config(load_config(config)?);
    let encoder = FrameEncoder::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame = RawFrame::from_json(trimmed)?;
        frame.validate()?;

        let analysis = engine.update(&frame);
        let payload = encoder.encode(&analysis);

        let rendered = match output_format {
            OutputFormat::Ndjson | OutputFormat::Json => serde_json::to_string(&payload)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
        };
        writeln!(stdout, "{}", rendered)?;
        if flush {
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_validate(
    input: &PathBuf,
    input_format: InputFormat,
    json: bool,
) -> Result<(), LimbusCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, &input_format)?;

    let errors: Vec<ValidationErrorDetail> = frames
        .iter()
        .enumerate()
        .filter_map(|(index, frame)| {
            frame.validate().err().map(|e| ValidationErrorDetail {
                index,
                error: e.to_string(),
            })
        })
        .collect();

    let report = ValidationReport {
        total_frames: frames.len(),
        valid_frames: frames.len() - errors.len(),
        invalid_frames: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Frame {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(LimbusCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, LimbusCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_frames(data: &str, format: &InputFormat) -> Result<Vec<RawFrame>, LimbusCliError> {
    match format {
        InputFormat::Ndjson => Ok(RawFrame::parse_ndjson(data)?),
        InputFormat::Json => Ok(serde_json::from_str(data)?),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, LimbusCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(AnalysisConfig::from_json(&json)?)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn format_output(
    payloads: &[FramePayload],
    format: &OutputFormat,
) -> Result<String, LimbusCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for payload in payloads {
                lines.push(serde_json::to_string(payload)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(payloads)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payloads)?),
    }
}
