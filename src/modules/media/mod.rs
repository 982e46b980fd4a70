use axum::routing::{get, post};
use axum::Router;
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::get_slot).delete(handler::clear_slot))
        .route("/upload-url", post(handler::create_upload_url))
}
