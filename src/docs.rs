use utoipa::OpenApi;

use crate::common::response::ErrorResponse;
use crate::modules::compression::dto::UploadImageForm;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::compression::handler::upload_image,
    ),
    components(
        schemas(ErrorResponse, UploadImageForm)
    ),
    tags(
        (name = "Compression", description = "On-demand JPEG re-encoding")
    )
)]
pub struct ApiDoc;
