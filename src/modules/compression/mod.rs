use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod dto;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod service;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/upload", post(handler::upload_image))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
}
