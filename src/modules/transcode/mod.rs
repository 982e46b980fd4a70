use axum::routing::post;
use axum::Router;
use crate::state::AppState;

pub mod download;
pub mod dto;
pub mod error;
pub mod ffmpeg;
pub mod handler;
pub mod scratch;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(handler::request_transcode))
}
