use verger_core::error::CoreError;
use verger_core::validation::FieldErrors;

/// Page-level failure of the last `load()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
    /// HTTP status, when the backend answered.
    pub status: Option<u16>,
}

/// Errors returned by [`ListController`](crate::ListController) commands.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Local validation failed; nothing was sent.
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// The advisory pre-check found the identifier already taken.
    #[error("Identifier '{0}' is already in use")]
    IdentifierTaken(String),

    /// The backend rejected a create/update/delete.
    #[error("{message}")]
    Submission { message: String, status: Option<u16> },

    #[error("Failed to load collection: {0}")]
    Load(LoadError),

    #[error("A submission is already in flight")]
    InFlight,

    #[error("No form is open")]
    NoForm,

    #[error("{entity} '{id}' is not in the list")]
    NotFound { entity: &'static str, id: String },

    /// The controller was torn down; late results are discarded.
    #[error("Controller has been torn down")]
    Cancelled,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
