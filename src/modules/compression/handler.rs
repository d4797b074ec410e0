use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::dto::UploadImageForm;
use super::service::ImageService;
use crate::common::response::{ApiError, ErrorResponse};
use crate::common::upload::{read_form, UploadForm};
use crate::state::AppState;

pub const PROCESSED_FILE_NAME: &str = "processed.jpg";

/// Compress an image
/// Re-encodes the uploaded image as a progressive JPEG at the requested quality
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Re-encoded image", content_type = "image/jpeg", body = Vec<u8>),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 413, description = "Payload Too Large"),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    tag = "Compression"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // A body that is not multipart at all simply has no file part.
    let form = match multipart {
        Ok(multipart) => match read_form(multipart).await {
            Ok(form) => form,
            Err(e) => {
                warn!("Failed to read multipart body: {}", e);
                return ApiError(e.body_text(), e.status()).into_response();
            }
        },
        Err(rejection) => {
            debug!("Upload request is not multipart: {}", rejection);
            UploadForm::default()
        }
    };

    match ImageService::process(&state.config, form).await {
        Ok(processed) => {
            debug!(
                "Returning {} bytes encoded at quality {}",
                processed.data.len(),
                processed.quality
            );
            jpeg_response(processed.data)
        }
        Err(e) => e.into_response(),
    }
}

fn jpeg_response(data: Bytes) -> Response {
    let disposition = format!("inline; filename=\"{}\"", PROCESSED_FILE_NAME);
    (
        [
            (header::CONTENT_TYPE, mime::IMAGE_JPEG.essence_str().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response()
}
