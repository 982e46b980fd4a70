use std::time::Duration;

use anyhow::{anyhow, Result};
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::infrastructure::storage::s3::StoredObject;
use crate::state::AppState;

use super::dto::{
    ClearResponse, MediaObjectResponse, SlotResponse, UploadUrlRequest, UploadUrlResponse,
};

pub struct MediaService;

impl MediaService {
    /// Current slot contents: at most one video and one subtitle, picked by
    /// key prefix.
    pub async fn slot(state: &AppState) -> Result<SlotResponse> {
        let objects = state.storage.list().await?;

        Ok(SlotResponse {
            video: pick(&objects, "video.").map(|o| to_response(state, o)),
            subtitle: pick(&objects, "subtitle.").map(|o| to_response(state, o)),
        })
    }

    /// Presigned PUT URL for replacing the slot video or subtitle. The key
    /// is fully derived server-side so uploads can only land on slot keys.
    pub async fn issue_upload_url(
        state: &AppState,
        req: UploadUrlRequest,
    ) -> Result<UploadUrlResponse> {
        let extension = normalize_extension(&req.extension)
            .ok_or_else(|| anyhow!("Invalid extension: {}", req.extension))?;

        let key = format!("{}.{}", req.kind.prefix(), extension);
        let content_type = mime_guess::from_ext(&extension)
            .first_or_octet_stream()
            .to_string();

        let upload_url = state
            .storage
            .presign_put(
                &key,
                &content_type,
                Duration::from_secs(state.config.upload_url_ttl_secs),
            )
            .await?;

        info!("🔗 Issued upload URL for {}", key);

        Ok(UploadUrlResponse { key, upload_url })
    }

    /// Delete everything in the slot. Deletes run in parallel; individual
    /// failures are collected rather than aborting the rest.
    pub async fn clear(state: &AppState) -> Result<ClearResponse> {
        let objects = state.storage.list().await?;

        let results = join_all(
            objects
                .iter()
                .map(|o| async move { (o.key.clone(), state.storage.delete(&o.key).await) }),
        )
        .await;

        let mut deleted = 0u32;
        let mut failed = 0u32;
        for (key, result) in results {
            match result {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!("Failed to delete {}: {}", key, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(anyhow!("Failed to delete {} of {} objects", failed, deleted + failed));
        }

        info!("🗑️ Cleared slot ({} objects)", deleted);
        Ok(ClearResponse { deleted })
    }
}

fn pick<'a>(objects: &'a [StoredObject], prefix: &str) -> Option<&'a StoredObject> {
    objects.iter().find(|o| o.key.starts_with(prefix))
}

fn to_response(state: &AppState, obj: &StoredObject) -> MediaObjectResponse {
    MediaObjectResponse {
        key: obj.key.clone(),
        size: obj.size,
        last_modified: obj.last_modified,
        url: state.storage.public_url(&obj.key),
    }
}

/// Lower-cased alphanumeric extension, leading dot stripped. None when the
/// caller sent something that cannot form a slot key.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::media::dto::MediaKind;

    #[test]
    fn extension_is_normalized() {
        assert_eq!(normalize_extension("MOV"), Some("mov".to_string()));
        assert_eq!(normalize_extension(".srt"), Some("srt".to_string()));
        assert_eq!(normalize_extension(" mp4 "), Some("mp4".to_string()));
    }

    #[test]
    fn malformed_extensions_are_rejected() {
        assert_eq!(normalize_extension(""), None);
        assert_eq!(normalize_extension("."), None);
        assert_eq!(normalize_extension("mp4/../../etc"), None);
        assert_eq!(normalize_extension("m p4"), None);
    }

    #[test]
    fn slot_keys_follow_the_prefix_convention() {
        let ext = normalize_extension("MKV").unwrap();
        assert_eq!(format!("{}.{}", MediaKind::Video.prefix(), ext), "video.mkv");
        let ext = normalize_extension("vtt").unwrap();
        assert_eq!(
            format!("{}.{}", MediaKind::Subtitle.prefix(), ext),
            "subtitle.vtt"
        );
    }

    #[test]
    fn pick_matches_prefix_only() {
        let objects = vec![
            StoredObject {
                key: "subtitle.srt".into(),
                size: 10,
                last_modified: None,
            },
            StoredObject {
                key: "video.mov".into(),
                size: 20,
                last_modified: None,
            },
        ];
        assert_eq!(pick(&objects, "video.").unwrap().key, "video.mov");
        assert_eq!(pick(&objects, "subtitle.").unwrap().key, "subtitle.srt");
        assert!(pick(&objects, "thumb.").is_none());
    }
}
