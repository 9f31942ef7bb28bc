use thiserror::Error;

/// Fatal problems with the raw match-log table. Any of these aborts a
/// pipeline run: a row without a usable timestamp or round cannot be
/// placed in a team's series.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("row {row}: invalid timestamp `{value}`")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: round `{value}` has no matchweek number")]
    InvalidRound { row: usize, value: String },

    #[error("row {row}: result `{value}` is not one of W, D, L")]
    InvalidResult { row: usize, value: String },

    #[error("row {row}: column `{column}` is not a number: `{value}`")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}
