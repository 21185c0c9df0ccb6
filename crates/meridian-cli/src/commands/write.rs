use std::fs;
use std::io::{self, Read};
use std::sync::Arc;

use meridian_core::{BatchAggregator, MemorySink, ServiceConfig};
use serde_json::json;

use crate::cli::WriteArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &WriteArgs, config: &ServiceConfig) -> Result<CommandResult, CliError> {
    let payload = read_input(&args.input)?;
    let aggregator = BatchAggregator::new(Arc::new(MemorySink::default()), config.write.clone());

    // A batch that cannot be interpreted fails the whole command.
    let report = aggregator.execute_raw(&payload).await?;

    let errors = report
        .outcomes
        .iter()
        .map(|outcome| outcome.error.clone())
        .collect();
    let data = json!({
        "submitted": report.submitted,
        "succeeded": report.succeeded,
        "errors": serde_json::to_value(&report.outcomes)?,
    });

    Ok(CommandResult::ok(data).with_errors(errors))
}

fn read_input(input: &str) -> Result<Vec<u8>, CliError> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        return Ok(buffer);
    }

    Ok(fs::read(input)?)
}
