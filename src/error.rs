//! Error types for the regression pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The header does not carry the columns the run was configured with.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// R² is undefined when the true target has no variance.
    #[error("Degenerate metric: {0}")]
    DegenerateMetric(String),

    /// Loss or predictions became non-finite. `epoch` is `None` when the
    /// divergence was only caught at evaluation time.
    #[error("Training diverged{}", epoch_suffix(.epoch))]
    TrainingDiverged { epoch: Option<usize> },

    #[error("Column '{column}' has zero variance")]
    ZeroVariance { column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(expected: impl ToString, got: impl ToString) -> Self {
        Error::ShapeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

fn epoch_suffix(epoch: &Option<usize>) -> String {
    match epoch {
        Some(epoch) => format!(" at epoch {epoch}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
