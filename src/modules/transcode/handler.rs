use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use crate::modules::transcode::dto::TranscodeResponse;
use crate::modules::transcode::service::TranscodeService;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

/// Replace the slot video with an audio-normalized MP4.
#[utoipa::path(
    post,
    path = "/api/v1/transcode",
    responses(
        (status = 200, description = "Video transcoded and published", body = ApiResponse<TranscodeResponse>),
        (status = 404, description = "No video in the slot"),
        (status = 500, description = "Pipeline stage failed")
    ),
    tag = "Transcode"
)]
pub async fn request_transcode(State(state): State<AppState>) -> impl IntoResponse {
    match TranscodeService::run(&state).await {
        Ok(outcome) => ApiSuccess(
            ApiResponse::success(
                TranscodeResponse {
                    key: outcome.key,
                    warning: outcome.warning,
                },
                "Video transcoded successfully",
            ),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => {
            error!("Transcode failed: {}", e);
            ApiError(e.to_string(), e.status()).into_response()
        }
    }
}
