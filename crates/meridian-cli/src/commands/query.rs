use std::collections::HashMap;
use std::sync::Arc;

use meridian_core::{
    format_duration, parse_duration, FixedResolutionExecutor, ReadHandler, ReadRequest,
    ServiceConfig, UtcDateTime,
};
use serde_json::json;

use crate::cli::QueryArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &QueryArgs, config: &ServiceConfig) -> Result<CommandResult, CliError> {
    let resolutions = args
        .resolutions
        .iter()
        .map(|raw| parse_duration(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let handler = ReadHandler::new(
        Arc::new(FixedResolutionExecutor::new(resolutions)),
        config.query.clone(),
    );

    let response = match (&args.start, &args.end) {
        (None, None) => {
            let request = ReadRequest::instant(&args.query, UtcDateTime::now(), handler.options())?;
            handler.handle_request(request)?
        }
        (start, end) => {
            let mut params = HashMap::from([(String::from("query"), args.query.clone())]);
            for (name, value) in [("start", start), ("end", end), ("step", &args.step)] {
                if let Some(value) = value {
                    params.insert(name.to_owned(), value.clone());
                }
            }
            handler.handle(&params)?
        }
    };

    let ranges = response
        .metadata
        .observed_ranges
        .iter()
        .map(|range| format_duration(*range))
        .collect::<Vec<_>>();
    let data = json!({
        "request": serde_json::to_value(&response.request)?,
        "exhaustive": response.metadata.exhaustive,
        "ranges": ranges,
    });

    Ok(CommandResult::ok(data).with_warnings(response.metadata.warning_strings()))
}
