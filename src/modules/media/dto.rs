use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Subtitle,
}

impl MediaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Subtitle => "subtitle",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UploadUrlRequest {
    pub kind: MediaKind,
    /// File extension of the upload, with or without the leading dot.
    pub extension: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadUrlResponse {
    pub key: String,
    pub upload_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct MediaObjectResponse {
    pub key: String,
    pub size: u64,
    /// Milliseconds since epoch.
    pub last_modified: Option<u64>,
    pub url: String,
}

#[derive(Serialize, ToSchema)]
pub struct SlotResponse {
    pub video: Option<MediaObjectResponse>,
    pub subtitle: Option<MediaObjectResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct ClearResponse {
    pub deleted: u32,
}
