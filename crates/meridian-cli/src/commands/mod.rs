mod classify;
mod query;
mod write;

use std::time::Instant;

use meridian_core::{ClassifiedError, Envelope, EnvelopeMeta, ServiceConfig};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<ClassifiedError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<ClassifiedError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    let CommandResult {
        data,
        warnings,
        errors,
    } = match &cli.command {
        Command::Write(args) => write::run(args, &config).await?,
        Command::Query(args) => query::run(args, &config)?,
        Command::Classify(args) => classify::run(args)?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(Uuid::new_v4().to_string(), latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }
    debug!(
        request_id = meta.request_id.as_str(),
        latency_ms,
        warnings = meta.warnings.len(),
        errors = errors.len(),
        "command complete"
    );

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    #[tokio::test]
    async fn write_command_reports_failed_indices() {
        let mut batch = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            batch,
            r#"{{"writes": [
                {{"series": "cpu", "timestamp": "2024-01-01T00:00:00Z", "value": 1.0}},
                {{"series": "", "timestamp": "2024-01-01T00:00:00Z", "value": 2.0}}
            ]}}"#
        )
        .expect("write batch");
        let path = batch.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["meridian", "write", "--input", path.as_str()])
            .expect("must parse");
        let envelope = run(&cli).await.expect("command succeeds");

        assert_eq!(envelope.data["submitted"], 2);
        assert_eq!(envelope.data["errors"][0]["index"], 1);
        assert_eq!(envelope.errors.len(), 1);
        assert!(envelope.errors[0].is_bad_request());
    }

    #[tokio::test]
    async fn query_command_surfaces_coverage_warning() {
        let mut config = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(config, "[query]\ndefault_evaluation_interval_ms = 15000").expect("write config");
        let path = config.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "meridian",
            "--config",
            path.as_str(),
            "query",
            "sum_over_time(cpu[10m])",
            "--resolution",
            "1h",
        ])
        .expect("must parse");
        let envelope = run(&cli).await.expect("command succeeds");

        assert_eq!(envelope.data["ranges"], serde_json::json!(["10m"]));
        assert_eq!(envelope.data["request"]["step"], "15s");
        assert_eq!(envelope.meta.warnings.len(), 1);
    }

    #[tokio::test]
    async fn malformed_batch_fails_command() {
        let mut batch = tempfile::NamedTempFile::new().expect("temp file");
        write!(batch, "not json").expect("write batch");
        let path = batch.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["meridian", "write", "--input", path.as_str()])
            .expect("must parse");
        let error = run(&cli).await.expect_err("command fails");

        assert_eq!(error.exit_code(), 3);
    }
}
