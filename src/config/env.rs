use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    Debug,
    AllowedExtensions,
    CompressionQuality,
    UploadFolder,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::Debug => "APP_DEBUG",
            EnvKey::AllowedExtensions => "ALLOWED_EXTENSIONS",
            EnvKey::CompressionQuality => "COMPRESSION_QUALITY",
            EnvKey::UploadFolder => "UPLOAD_FOLDER",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Unset means `default`; a value that is set but does not parse is reported
/// back as the raw string so startup can fail loudly.
pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> Result<T, String> {
    match get(key) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| val),
        Err(_) => Ok(default),
    }
}

/// Accepts the usual spellings of a boolean flag (`1`, `true`, `yes`, `on`).
pub fn get_flag(key: EnvKey, default: bool) -> Result<bool, String> {
    match get(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(val),
        },
        Err(_) => Ok(default),
    }
}
