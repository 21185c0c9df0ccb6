//! CLI argument definitions for meridian.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `write` | Run a JSON write batch and report per-item failures |
//! | `query` | Inspect a PromQL query for range coverage warnings |
//! | `classify` | Show the wire shape of a classified error |
//!
//! # Examples
//!
//! ```bash
//! meridian write --input batch.json --pretty
//! meridian query 'sum_over_time(cpu[10m])' --resolution 1h
//! meridian classify resource-exhausted "too many in-flight writes"
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Write-path and read-path boundary tooling for meridian.
#[derive(Debug, Parser)]
#[command(name = "meridian", author, version, about)]
pub struct Cli {
    /// Path to a TOML service configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Plain text summary for terminals.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a write batch against an in-memory store.
    ///
    /// The input is a JSON document of the form {"writes": [...]}; each
    /// write has series, timestamp, value and optional tags.
    Write(WriteArgs),

    /// Parse a query and report range coverage warnings.
    Query(QueryArgs),

    /// Construct a classified error and print its wire shape.
    Classify(ClassifyArgs),
}

#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Batch file to read, or '-' for stdin.
    #[arg(long, default_value = "-")]
    pub input: String,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// PromQL query text.
    pub query: String,

    /// Range start (RFC3339 or unix seconds). Omit for an instant query.
    #[arg(long)]
    pub start: Option<String>,

    /// Range end (RFC3339 or unix seconds).
    #[arg(long)]
    pub end: Option<String>,

    /// Evaluation step; defaults to the configured evaluation interval.
    #[arg(long)]
    pub step: Option<String>,

    /// Resolution of the stored data backing the query (repeatable).
    #[arg(long = "resolution")]
    pub resolutions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorClass {
    Internal,
    BadRequest,
    ResourceExhausted,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Error class to construct.
    #[arg(value_enum)]
    pub class: ErrorClass,

    /// Underlying failure message.
    pub message: String,
}
