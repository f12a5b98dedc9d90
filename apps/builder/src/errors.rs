use thiserror::Error;

/// Crate-level error type.
/// Every fallible operation in the pipeline returns `Result<T, BuilderError>`.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Export failed: {0}")]
    ExportFailed(String),
}

impl From<tera::Error> for BuilderError {
    fn from(e: tera::Error) -> Self {
        // tera nests the useful message in its source chain
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        BuilderError::Template(message)
    }
}

pub type Result<T> = std::result::Result<T, BuilderError>;
