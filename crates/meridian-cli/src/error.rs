use meridian_core::ClassifiedError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] meridian_core::ValidationError),

    #[error(transparent)]
    Core(#[from] meridian_core::CoreError),

    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Classified(err) if err.is_bad_request() => 3,
            Self::StrictModeViolation { .. } => 5,
            Self::Core(_) | Self::Classified(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
