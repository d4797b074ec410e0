use utoipa::ToSchema;

/// Multipart body of `POST /api/upload`. Only used for the OpenAPI schema;
/// the handler reads the parts itself.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageForm {
    /// Image to re-encode (png, jpg, jpeg or gif).
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// JPEG quality. Falls back to the server default when missing.
    #[schema(minimum = 0, maximum = 100)]
    pub quality: Option<u8>,
}
