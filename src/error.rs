use thiserror::Error;

// ---------------------------------------------------------------------------
// AnalysisError – every way the pipeline can fail
// ---------------------------------------------------------------------------

/// Fatal pipeline errors. None of these is retried; the binary reports the
/// error and exits non-zero.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Wrong command-line arguments.
    #[error("usage: {0}")]
    Usage(String),

    /// Missing, unreadable, empty or non-numeric input.
    #[error("malformed input in {source_name}: {detail}")]
    MalformedInput { source_name: String, detail: String },

    /// Row count is not a whole number of runs.
    #[error("{rows} rows cannot be split into whole runs of {sizes} sizes")]
    IncompleteRun { rows: usize, sizes: usize },

    /// A run measures the same size twice, so its rows cannot be aligned
    /// with the canonical size order.
    #[error("run {run} measures size {size} more than once")]
    MisalignedRun { run: usize, size: f64 },

    /// A chart could not be produced.
    #[error("failed to render {chart}: {message}")]
    Render { chart: String, message: String },

    /// The JSON summary could not be written.
    #[error("failed to write summary to {path}: {message}")]
    Report { path: String, message: String },
}

impl AnalysisError {
    pub fn malformed(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        AnalysisError::MalformedInput {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    pub fn render(chart: impl Into<String>, message: impl ToString) -> Self {
        AnalysisError::Render {
            chart: chart.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
