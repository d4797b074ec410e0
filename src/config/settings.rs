use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::config::env::{self, EnvKey};

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "png,jpg,jpeg,gif";
pub const DEFAULT_COMPRESSION_QUALITY: u8 = 50;
pub const DEFAULT_UPLOAD_FOLDER: &str = "static/uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("COMPRESSION_QUALITY must be between 0 and 100, got {0}")]
    QualityOutOfRange(u32),

    #[error("ALLOWED_EXTENSIONS must name at least one extension")]
    NoAllowedExtensions,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub debug: bool,
    /// Lowercase, without the leading dot.
    pub allowed_extensions: HashSet<String>,
    pub compression_quality: u8,
    pub upload_folder: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let server_port = env::get_parsed(EnvKey::ServerPort, 8080u16).map_err(|value| {
            ConfigError::InvalidValue {
                key: EnvKey::ServerPort.as_str(),
                value,
            }
        })?;
        let debug = env::get_flag(EnvKey::Debug, true).map_err(|value| {
            ConfigError::InvalidValue {
                key: EnvKey::Debug.as_str(),
                value,
            }
        })?;
        let quality = env::get_parsed(
            EnvKey::CompressionQuality,
            u32::from(DEFAULT_COMPRESSION_QUALITY),
        )
        .map_err(|value| ConfigError::InvalidValue {
            key: EnvKey::CompressionQuality.as_str(),
            value,
        })?;
        let max_upload_bytes = env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES)
            .map_err(|value| ConfigError::InvalidValue {
                key: EnvKey::MaxUploadBytes.as_str(),
                value,
            })?;

        Ok(Self {
            server_port,
            debug,
            allowed_extensions: parse_extensions(&env::get_or(
                EnvKey::AllowedExtensions,
                DEFAULT_ALLOWED_EXTENSIONS,
            ))?,
            compression_quality: validate_quality(quality)?,
            upload_folder: PathBuf::from(env::get_or(EnvKey::UploadFolder, DEFAULT_UPLOAD_FOLDER)),
            max_upload_bytes,
        })
    }

    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(extension.to_ascii_lowercase().as_str())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            debug: true,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .split(',')
                .map(str::to_string)
                .collect(),
            compression_quality: DEFAULT_COMPRESSION_QUALITY,
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Splits a comma separated list, tolerating blanks, dots and mixed case:
/// `" PNG, .jpg ,,gif"` yields `{png, jpg, gif}`.
fn parse_extensions(raw: &str) -> Result<HashSet<String>, ConfigError> {
    let extensions: HashSet<String> = raw
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();

    if extensions.is_empty() {
        return Err(ConfigError::NoAllowedExtensions);
    }
    Ok(extensions)
}

fn validate_quality(quality: u32) -> Result<u8, ConfigError> {
    u8::try_from(quality)
        .ok()
        .filter(|q| *q <= 100)
        .ok_or(ConfigError::QualityOutOfRange(quality))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = AppConfig::default();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.compression_quality, 50);
        assert_eq!(config.allowed_extensions.len(), 4);
        for ext in ["png", "jpg", "jpeg", "gif"] {
            assert!(config.is_allowed_extension(ext), "{ext} should be allowed");
        }
    }

    #[test]
    fn extension_check_ignores_case() {
        let config = AppConfig::default();

        assert!(config.is_allowed_extension("JPG"));
        assert!(config.is_allowed_extension("Png"));
        assert!(!config.is_allowed_extension("txt"));
        assert!(!config.is_allowed_extension(""));
    }

    #[test]
    fn parse_extensions_normalizes_entries() {
        let parsed = parse_extensions(" PNG, .jpg ,,gif").unwrap();

        let expected: HashSet<String> = ["png", "jpg", "gif"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_extensions_rejects_empty_list() {
        assert!(matches!(
            parse_extensions(" , ,"),
            Err(ConfigError::NoAllowedExtensions)
        ));
    }

    #[test]
    fn validate_quality_bounds() {
        assert_eq!(validate_quality(0).unwrap(), 0);
        assert_eq!(validate_quality(100).unwrap(), 100);
        assert!(matches!(
            validate_quality(101),
            Err(ConfigError::QualityOutOfRange(101))
        ));
        assert!(matches!(
            validate_quality(1000),
            Err(ConfigError::QualityOutOfRange(1000))
        ));
    }
}
