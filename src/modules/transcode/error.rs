use axum::http::StatusCode;
use thiserror::Error;

/// One variant per pipeline stage. The first failure wins and the stages
/// after it never run; scratch cleanup runs regardless.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("no video object present in the slot")]
    NotFound,

    #[error("download failed: {0}")]
    Download(String),

    #[error("transcoder failed (exit code {code:?}): {detail}")]
    Process { code: Option<i32>, detail: String },

    #[error("publish failed: {0}")]
    Publish(String),
}

impl TranscodeError {
    pub fn status(&self) -> StatusCode {
        match self {
            TranscodeError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_video_maps_to_not_found() {
        assert_eq!(TranscodeError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn stage_failures_map_to_server_error() {
        let errors = [
            TranscodeError::Download("timeout".into()),
            TranscodeError::Process {
                code: Some(1),
                detail: "bad input".into(),
            },
            TranscodeError::Publish("upload refused".into()),
        ];
        for e in errors {
            assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
