use verger_client::{ApiError, ConfigError};
use verger_controller::ControllerError;
use verger_core::error::CoreError;
use verger_core::validation::FieldErrors;

/// Exit code for configuration problems. Usage errors exit with clap's `2`.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code when the input was rejected before reaching the backend.
pub const EXIT_REJECTED: u8 = 3;
/// Exit code for everything else.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ConsoleError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ConsoleError::Config(_) => EXIT_CONFIG,
            ConsoleError::Core(_)
            | ConsoleError::Controller(
                ControllerError::Validation(_)
                | ControllerError::IdentifierTaken(_)
                | ControllerError::NotFound { .. }
                | ControllerError::Core(_),
            ) => EXIT_REJECTED,
            _ => EXIT_FAILURE,
        }
    }

    /// Per-field messages for a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ConsoleError::Controller(ControllerError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}
