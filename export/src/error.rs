use crate::bundle::TemplateError;
use argonath_core::error::{ArgonathError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("payload must contain `nodes` and `edges` arrays")]
    MissingGraphKeys,
    #[error("malformed {kind} at index {index}: {reason}")]
    MalformedEntry {
        kind: &'static str,
        index: usize,
        reason: String,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("image export failed: {0}")]
    Image(String),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// True when the bytes handed to an import were unusable.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            ExportError::InvalidJson(_)
                | ExportError::MissingGraphKeys
                | ExportError::MalformedEntry { .. }
        )
    }
}

impl ArgonathError for ExportError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ExportError::InvalidJson(_)
            | ExportError::MissingGraphKeys
            | ExportError::MalformedEntry { .. } => ErrorCode::InvalidArgument,
            ExportError::Template(TemplateError::Unavailable { .. }) => ErrorCode::Unavailable,
            ExportError::Template(TemplateError::MissingMarker { .. }) => {
                ErrorCode::FailedPrecondition
            }
            ExportError::Serialization(_)
            | ExportError::Image(_)
            | ExportError::Zip(_)
            | ExportError::Io(_) => ErrorCode::Internal,
        }
    }
}
