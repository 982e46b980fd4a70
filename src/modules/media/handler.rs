use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::modules::media::dto::*;
use crate::modules::media::service::MediaService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

#[utoipa::path(
    get,
    path = "/api/v1/media",
    responses(
        (status = 200, description = "Current slot contents", body = ApiResponse<SlotResponse>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn get_slot(State(state): State<AppState>) -> impl IntoResponse {
    match MediaService::slot(&state).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Slot retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::internal(e.to_string()).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/media/upload-url",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Presigned upload URL issued", body = ApiResponse<UploadUrlResponse>),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn create_upload_url(
    State(state): State<AppState>,
    Json(req): Json<UploadUrlRequest>,
) -> impl IntoResponse {
    // Reject malformed extensions up front; everything past this point is a
    // storage failure.
    if super::service::normalize_extension(&req.extension).is_none() {
        return ApiError(
            format!("Invalid extension: {}", req.extension),
            StatusCode::BAD_REQUEST,
        )
        .into_response();
    }

    match MediaService::issue_upload_url(&state, req).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Upload URL issued successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::internal(e.to_string()).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/media",
    responses(
        (status = 200, description = "Slot cleared", body = ApiResponse<ClearResponse>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn clear_slot(State(state): State<AppState>) -> impl IntoResponse {
    match MediaService::clear(&state).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Slot cleared successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::internal(e.to_string()).into_response(),
    }
}
