use std::collections::HashMap;

use axum::extract::{multipart::MultipartError, Multipart};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::debug;

/// A file part of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client supplied filename. Empty when the part carried `filename=""`.
    pub file_name: String,
    pub data: Bytes,
}

/// Framework-free view of a multipart request: text fields and file parts,
/// keyed by part name. Only the first part of a given name is kept.
#[derive(Debug, Default, Clone)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file_name: &str, data: impl Into<Bytes>) -> Self {
        self.files
            .entry(name.to_string())
            .or_insert_with(|| UploadedFile {
                file_name: file_name.to_string(),
                data: data.into(),
            });
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Drains every part of the request into memory.
///
/// A part that declares a `filename` (even an empty one) is a file, anything
/// else is a text field.
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        match file_name {
            Some(file_name) => {
                debug!("Received file part '{}' ({} bytes)", name, buffer.len());
                form = form.with_file(&name, &file_name, buffer.freeze());
            }
            None => {
                let value = String::from_utf8_lossy(&buffer);
                form = form.with_field(&name, &value);
            }
        }
    }

    Ok(form)
}
