use thiserror::Error;

/// Input rejected before it reaches a store: a required field is missing or
/// blank, or an edit carries nothing to change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field must not be blank: {0}")]
    BlankField(&'static str),

    #[error("at least one field is required to update")]
    EmptyPatch,

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
