use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::encoder::EncodeError;
use crate::common::response::ApiError;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("Quality must be between 0 and 100")]
    QualityOutOfRange,

    #[error("Invalid image content")]
    InvalidContent,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<EncodeError> for UploadError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::InvalidContent => UploadError::InvalidContent,
            other => UploadError::Internal(other.into()),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        ApiError(self.to_string(), self.status()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        for err in [
            UploadError::NoFilePart,
            UploadError::NoSelectedFile,
            UploadError::FileTypeNotAllowed,
            UploadError::QualityOutOfRange,
            UploadError::InvalidContent,
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{err}");
        }
    }

    #[test]
    fn invalid_content_stays_a_client_error() {
        let err = UploadError::from(EncodeError::InvalidContent);

        assert!(matches!(err, UploadError::InvalidContent));
        assert_eq!(err.to_string(), "Invalid image content");
    }

    #[test]
    fn encode_failure_becomes_internal_error() {
        let err = UploadError::from(EncodeError::EncodeFailure {
            detail: "boom".to_string(),
        });

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal error: Could not encode image: boom");
    }
}
