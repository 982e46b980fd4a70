use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::media::handler::get_slot,
        crate::modules::media::handler::create_upload_url,
        crate::modules::media::handler::clear_slot,
        crate::modules::transcode::handler::request_transcode,
    ),
    components(
        schemas(
            crate::modules::media::dto::MediaKind,
            crate::modules::media::dto::UploadUrlRequest,
            crate::modules::media::dto::UploadUrlResponse,
            crate::modules::media::dto::MediaObjectResponse,
            crate::modules::media::dto::SlotResponse,
            crate::modules::media::dto::ClearResponse,
            crate::modules::transcode::dto::TranscodeResponse,
        )
    ),
    tags(
        (name = "Media", description = "Shared media slot management"),
        (name = "Transcode", description = "Audio normalization pipeline")
    )
)]
pub struct ApiDoc;
