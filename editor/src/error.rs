use argonath_core::auth::AuthzError;
use argonath_core::error::{ArgonathError, ErrorCode};
use export::ExportError;
use std::fmt;
use storage::{ProfileError, RecordError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("a mind map name is required")]
    MissingName,
    #[error("backend error: {0}")]
    Record(#[from] RecordError),
    #[error("authorization error: {0}")]
    Unauthorized(#[from] AuthzError),
    #[error("saved mind map {id} has unusable data: {source}")]
    MalformedRecord { id: String, source: ExportError },
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

impl ArgonathError for GatewayError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GatewayError::MissingName => ErrorCode::InvalidArgument,
            GatewayError::Record(err) => err.error_code(),
            GatewayError::Unauthorized(err) => err.error_code(),
            GatewayError::MalformedRecord { .. } => ErrorCode::FailedPrecondition,
            GatewayError::Export(err) => err.error_code(),
        }
    }
}

/// Optional session capabilities, switched by `[features]` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    ProfileSearch,
    JsonExport,
    ImageExport,
    StaticSiteExport,
    HtmlExport,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::ProfileSearch => "profile_search",
            Feature::JsonExport => "json_export",
            Feature::ImageExport => "image_export",
            Feature::StaticSiteExport => "static_site_export",
            Feature::HtmlExport => "html_export",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("feature {0} is disabled for this session")]
    FeatureDisabled(Feature),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("node {0} is not on the map")]
    UnknownNode(String),
    #[error("edge {0} is not on the map")]
    UnknownEdge(String),
    #[error("no edit form is open")]
    NoActiveForm,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ArgonathError for EditorError {
    fn error_code(&self) -> ErrorCode {
        match self {
            EditorError::FeatureDisabled(_) | EditorError::NoActiveForm => {
                ErrorCode::FailedPrecondition
            }
            EditorError::Validation(_) => ErrorCode::InvalidArgument,
            EditorError::UnknownNode(_) | EditorError::UnknownEdge(_) => ErrorCode::NotFound,
            EditorError::Store(err) => err.error_code(),
            EditorError::Profile(err) => err.error_code(),
            EditorError::Gateway(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_nested_errors_to_codes() {
        let denied = EditorError::from(GatewayError::from(AuthzError::NotCreator {
            subject: "u2".to_string(),
            creator: "u1".to_string(),
        }));
        assert_eq!(denied.error_code(), ErrorCode::PermissionDenied);

        let malformed = EditorError::from(GatewayError::from(ExportError::MissingGraphKeys));
        assert_eq!(malformed.error_code(), ErrorCode::InvalidArgument);
        assert!(malformed.is_user_input());
        assert!(!denied.is_user_input());

        let disabled = EditorError::FeatureDisabled(Feature::HtmlExport);
        assert_eq!(disabled.error_code(), ErrorCode::FailedPrecondition);
        assert_eq!(
            disabled.to_string(),
            "feature html_export is disabled for this session"
        );

        let duplicate = EditorError::from(StoreError::DuplicateNode("p1".to_string()));
        assert_eq!(duplicate.error_code(), ErrorCode::AlreadyExists);
    }
}
