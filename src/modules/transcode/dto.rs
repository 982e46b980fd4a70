use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct TranscodeResponse {
    /// Key the transcoded video was published under.
    pub key: String,
    /// Present when the original object could not be retired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
