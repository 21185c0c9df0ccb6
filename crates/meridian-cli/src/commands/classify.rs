use meridian_core::ClassifiedError;
use serde_json::json;

use crate::cli::{ClassifyArgs, ErrorClass};
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &ClassifyArgs) -> Result<CommandResult, CliError> {
    let error = match args.class {
        ErrorClass::Internal => ClassifiedError::new_internal(&args.message),
        ErrorClass::BadRequest => ClassifiedError::new_bad_request(&args.message),
        ErrorClass::ResourceExhausted => ClassifiedError::new_resource_exhausted(&args.message),
    };

    let data = json!({
        "error": serde_json::to_value(&error)?,
        "retry_guidance": serde_json::to_value(error.retry_guidance())?,
    });

    Ok(CommandResult::ok(data))
}
