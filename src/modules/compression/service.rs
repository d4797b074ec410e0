use std::num::IntErrorKind;

use anyhow::anyhow;
use bytes::Bytes;
use tracing::{error, info, warn};

use super::encoder::{self, EncodeError, MAX_QUALITY};
use super::error::UploadError;
use crate::common::upload::UploadForm;
use crate::config::settings::AppConfig;

pub const FILE_FIELD: &str = "file";
pub const QUALITY_FIELD: &str = "quality";

#[derive(Debug)]
pub struct ProcessedImage {
    pub data: Bytes,
    pub quality: u8,
}

/// What the `quality` form field resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityField {
    /// Missing, or not an integer at all.
    Absent,
    InRange(u8),
    /// Holds the offending value as it should appear in logs.
    OutOfRange(String),
}

/// Integers (with optional sign and surrounding whitespace) are checked
/// against 0-100; anything else counts as absent.
pub fn parse_quality(raw: Option<&str>) -> QualityField {
    let Some(raw) = raw else {
        return QualityField::Absent;
    };
    let trimmed = raw.trim();

    match trimmed.parse::<i64>() {
        Ok(value) => match u8::try_from(value) {
            Ok(quality) if quality <= MAX_QUALITY => QualityField::InRange(quality),
            _ => QualityField::OutOfRange(value.to_string()),
        },
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                QualityField::OutOfRange(trimmed.to_string())
            }
            _ => QualityField::Absent,
        },
    }
}

/// Extension after the last `.`, checked case-insensitively.
pub fn allowed_file(config: &AppConfig, file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, extension)| config.is_allowed_extension(extension))
}

pub struct ImageService;

impl ImageService {
    /// Validates the form in a fixed order, stopping at the first problem,
    /// then re-encodes the file on the blocking pool.
    pub async fn process(config: &AppConfig, form: UploadForm) -> Result<ProcessedImage, UploadError> {
        Self::process_with(config, form, encoder::encode).await
    }

    async fn process_with<F>(
        config: &AppConfig,
        mut form: UploadForm,
        encode: F,
    ) -> Result<ProcessedImage, UploadError>
    where
        F: FnOnce(Bytes, &str, u8) -> Result<Bytes, EncodeError> + Send + 'static,
    {
        let Some(file) = form.take_file(FILE_FIELD) else {
            warn!("Upload request missing file part");
            return Err(UploadError::NoFilePart);
        };

        if file.file_name.is_empty() {
            warn!("Upload request with empty filename");
            return Err(UploadError::NoSelectedFile);
        }

        if !allowed_file(config, &file.file_name) {
            warn!("File type not allowed: {}", file.file_name);
            return Err(UploadError::FileTypeNotAllowed);
        }

        let quality = match parse_quality(form.field(QUALITY_FIELD)) {
            QualityField::Absent => config.compression_quality,
            QualityField::InRange(quality) => quality,
            QualityField::OutOfRange(value) => {
                warn!(
                    "Invalid quality parameter: {} for file {}",
                    value, file.file_name
                );
                return Err(UploadError::QualityOutOfRange);
            }
        };

        info!(
            file_name = %file.file_name,
            quality,
            "Processing image: {} with quality {}",
            file.file_name,
            quality
        );

        let file_name = file.file_name.clone();
        let outcome = tokio::task::spawn_blocking(move || encode(file.data, &file.file_name, quality))
        .await;

        let result = match outcome {
            Ok(Ok(data)) => return Ok(ProcessedImage { data, quality }),
            Ok(Err(e @ EncodeError::InvalidContent)) => {
                warn!("Validation error for file {}: {}", file_name, e);
                UploadError::from(e)
            }
            Ok(Err(e)) => UploadError::from(e),
            Err(join_error) => UploadError::Internal(anyhow!("encoder task failed: {}", join_error)),
        };

        if let UploadError::Internal(e) = &result {
            error!(
                error = ?e,
                "Internal error processing file {}: {}",
                file_name,
                e
            );
        }

        Err(result)
    }
}
