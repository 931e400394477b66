#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown field '{field}' for {entity}")]
    UnknownField { entity: &'static str, field: String },

    #[error("Field '{0}' cannot be edited in this form")]
    FieldNotEditable(String),

    #[error("Invalid page size {size}; allowed: {allowed:?}")]
    InvalidPageSize { size: usize, allowed: &'static [usize] },

    #[error("No form is open for editing")]
    FormNotOpen,

    #[error("Invalid field value: {0}")]
    InvalidValue(String),
}
