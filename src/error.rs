use thiserror::Error;

/// Errors raised while reading records or placing labels.
///
/// Degenerate geometry and non-converging collision passes are not errors;
/// they degrade the output and are reported through the placement results.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("undefined field `{field}` in first record: {record}")]
    MissingField { field: String, record: String },

    #[error("field `{field}` of record {index} is not a number")]
    InvalidValue { field: String, index: usize },

    #[error("record {index} projects to a non-finite position ({x}, {y})")]
    NonFinitePosition { index: usize, x: f32, y: f32 },

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("invalid dataset: {0}")]
    InvalidData(String),

    #[error("expected {expected} measured extents, got {actual}")]
    ExtentCount { expected: usize, actual: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = LabelError> = std::result::Result<T, E>;
