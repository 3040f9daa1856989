use thiserror::Error;

use crate::data::model::CellValue;

/// Error type used across the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: CellValue,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
