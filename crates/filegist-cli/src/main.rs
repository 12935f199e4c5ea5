//! # filegist CLI
//!
//! Command-line interface for filegist attachment extraction.
//!
//! ## Commands
//!
//! - `filegist extract <PATHS>...` - Extract text from files
//! - `filegist detect <PATHS>...` - Show the classified type and eligibility of files
//! - `filegist validate <PATHS>...` - Run upload validation on files
//!
//! ## Examples
//!
//! ```bash
//! # Extract a batch and render it for a prompt
//! filegist extract notes.md report.pdf bundle.zip --format prompt
//!
//! # Machine-readable output, one file at a time
//! filegist extract *.pdf --format json --max-concurrent 1
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use filegist::core::io::display_name;
use filegist::{
    ExtractionConfig, FilegistError, ProcessingStatus, ProgressCallback, classify, extract_paths,
    format_batch_for_prompt, is_supported, validate_upload,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "filegist")]
#[command(about = "Extract prompt-ready text from attachments")]
#[command(version)]
struct Cli {
    /// Path to a config file (.toml, .yaml, .yml or .json). Defaults to the
    /// nearest filegist.toml in the current directory or its parents.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Prompt,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from files
    Extract {
        /// Files to extract
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Maximum number of files extracted at once
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Print per-file progress to stderr
        #[arg(long)]
        progress: bool,
    },

    /// Show the classified type, MIME type and eligibility of files
    Detect {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Check whether files would be accepted as uploads
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    match path {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let discovered = ExtractionConfig::discover().context("Failed to discover filegist.toml")?;
            if discovered.is_none() {
                tracing::debug!("no filegist.toml found, using defaults");
            }
            Ok(discovered.unwrap_or_default())
        }
    }
}

async fn run_extract(
    paths: &[PathBuf],
    mut config: ExtractionConfig,
    format: OutputFormat,
    max_concurrent: Option<usize>,
    show_progress: bool,
) -> Result<ExitCode> {
    if max_concurrent.is_some() {
        config.max_concurrent_extractions = max_concurrent;
    }

    let progress: Option<ProgressCallback> = show_progress.then(|| {
        Arc::new(|name: &str, status: ProcessingStatus, error: Option<&str>| match error {
            Some(error) => eprintln!("[{}] {}: {}", status, name, error),
            None => eprintln!("[{}] {}", status, name),
        }) as ProgressCallback
    });

    let report = extract_paths(paths, &config, progress).await;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Prompt => println!("{}", format_batch_for_prompt(&report)),
        OutputFormat::Text => {
            for content in &report.successful {
                println!(
                    "==> {} ({}, {} chars) <==",
                    content.file_name, content.file_type, content.extracted_size
                );
                println!("{}", content.content);
            }
            for failed in &report.failed {
                eprintln!("error: {}: {}", failed.file_name, failed.error);
            }
        }
    }

    Ok(if report.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_detect(paths: &[PathBuf], config: &ExtractionConfig) -> Result<ExitCode> {
    for path in paths {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
        let file_type = classify(&display_name(path));
        let eligibility = if is_supported(file_type, metadata.len(), config) {
            "eligible"
        } else {
            "ineligible"
        };

        println!(
            "{}\t{}\t{}\t{}",
            path.display(),
            file_type,
            file_type.mime_type(),
            eligibility
        );
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_validate(paths: &[PathBuf], config: &ExtractionConfig) -> Result<ExitCode> {
    let mut rejected = 0usize;

    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        match validate_upload(&display_name(path), &bytes, config) {
            Ok(()) => println!("ok\t{}", path.display()),
            Err(FilegistError::Validation { message, .. }) => {
                rejected += 1;
                println!("rejected\t{}\t{}", path.display(), message);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(if rejected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            paths,
            format,
            max_concurrent,
            progress,
        } => run_extract(&paths, config, format, max_concurrent, progress).await,
        Commands::Detect { paths } => run_detect(&paths, &config).await,
        Commands::Validate { paths } => run_validate(&paths, &config).await,
    }
}
