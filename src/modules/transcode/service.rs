use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::infrastructure::storage::s3::{StorageService, StoredObject};
use crate::state::AppState;

use super::download;
use super::error::TranscodeError;
use super::ffmpeg;
use super::scratch::ScratchSpace;

/// Keys the slot recognizes as "the video".
pub const VIDEO_PREFIX: &str = "video.";

/// Every successful transcode publishes under this key.
pub const CANONICAL_KEY: &str = "video.mp4";

/// Store operations the pipeline consumes. A seam so the orchestration can
/// run against a fake store in tests.
pub(crate) trait SlotStore {
    fn public_url(&self, key: &str) -> String;
    async fn list(&self) -> Result<Vec<StoredObject>>;
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

impl SlotStore for StorageService {
    fn public_url(&self, key: &str) -> String {
        StorageService::public_url(self, key)
    }

    async fn list(&self) -> Result<Vec<StoredObject>> {
        Ok(StorageService::list(self).await?)
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<()> {
        StorageService::put_file(self, key, path, content_type).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        Ok(StorageService::delete(self, key).await?)
    }
}

/// The external transcoder stage, injectable for the same reason.
pub(crate) trait Transcoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

pub(crate) struct FfmpegTranscoder {
    pub timeout: Duration,
}

impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        ffmpeg::transcode(input, output, self.timeout).await
    }
}

#[derive(Debug)]
pub struct TranscodeOutcome {
    pub key: String,
    /// Set when the original object survived a failed retire after publish.
    pub warning: Option<String>,
}

pub struct TranscodeService;

impl TranscodeService {
    pub async fn run(state: &AppState) -> Result<TranscodeOutcome, TranscodeError> {
        let transcoder = FfmpegTranscoder {
            timeout: Duration::from_secs(state.config.ffmpeg_timeout_secs),
        };
        Self::run_pipeline(
            &state.storage,
            &state.http,
            &transcoder,
            &std::env::temp_dir(),
        )
        .await
    }

    /// Locate, download, transcode, publish, retire. Strictly sequential;
    /// the first failing stage wins and later stages never run.
    pub(crate) async fn run_pipeline<S: SlotStore, T: Transcoder>(
        store: &S,
        http: &reqwest::Client,
        transcoder: &T,
        scratch_dir: &Path,
    ) -> Result<TranscodeOutcome, TranscodeError> {
        let objects = store
            .list()
            .await
            .map_err(|e| TranscodeError::Download(format!("listing slot failed: {}", e)))?;

        // An empty slot must bail out before any scratch file exists or any
        // process spawns.
        let source = match find_video_object(&objects) {
            Some(obj) => obj.clone(),
            None => return Err(TranscodeError::NotFound),
        };

        info!("🎬 Transcoding {} ({} bytes)", source.key, source.size);

        let mut scratch = ScratchSpace::in_dir(scratch_dir);
        let input_path = scratch.allocate("input", &source_extension(&source.key));
        let output_path = scratch.allocate("output", "mp4");

        let result = Self::execute(
            store,
            http,
            transcoder,
            &source.key,
            &input_path,
            &output_path,
        )
        .await;

        // Runs whichever way the stages ended, and never replaces their
        // outcome.
        scratch.cleanup().await;

        result
    }

    async fn execute<S: SlotStore, T: Transcoder>(
        store: &S,
        http: &reqwest::Client,
        transcoder: &T,
        source_key: &str,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<TranscodeOutcome, TranscodeError> {
        let url = store.public_url(source_key);
        download::download_to_file(http, &url, input_path).await?;
        info!("⬇️ Downloaded {} to {}", url, input_path.display());

        transcoder.transcode(input_path, output_path).await?;

        store
            .put_file(CANONICAL_KEY, output_path, "video/mp4")
            .await
            .map_err(|e| TranscodeError::Publish(e.to_string()))?;

        // Retiring the original is compensating only: the slot already holds
        // the canonical video, so a failed delete downgrades to a warning.
        // Key comparison is exact and case-sensitive.
        let mut warning = None;
        if source_key != CANONICAL_KEY {
            if let Err(e) = store.delete(source_key).await {
                warn!("Failed to delete original {}: {}", source_key, e);
                warning = Some(format!(
                    "original object {} could not be deleted: {}",
                    source_key, e
                ));
            }
        }

        info!("✅ Published {}", CANONICAL_KEY);

        Ok(TranscodeOutcome {
            key: CANONICAL_KEY.to_string(),
            warning,
        })
    }
}

/// First listed object carrying the video prefix.
pub fn find_video_object(objects: &[StoredObject]) -> Option<&StoredObject> {
    objects.iter().find(|o| o.key.starts_with(VIDEO_PREFIX))
}

/// Extension of the source key, lower-cased, for the scratch input path.
pub fn source_extension(key: &str) -> String {
    key.rsplit('.')
        .next()
        .filter(|e| !e.is_empty())
        .unwrap_or("bin")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;
    use std::sync::Mutex;

    fn obj(key: &str) -> StoredObject {
        StoredObject {
            key: key.to_string(),
            size: 1,
            last_modified: None,
        }
    }

    #[test]
    fn picks_first_video_key() {
        let objects = vec![obj("subtitle.srt"), obj("video.mov"), obj("video.webm")];
        assert_eq!(find_video_object(&objects).unwrap().key, "video.mov");
    }

    #[test]
    fn empty_or_unrelated_slot_has_no_video() {
        assert!(find_video_object(&[]).is_none());
        assert!(find_video_object(&[obj("subtitle.vtt")]).is_none());
        // Prefix must match exactly; "videos.mov" is not the slot video.
        assert!(find_video_object(&[obj("videos.mov")]).is_none());
    }

    #[test]
    fn extension_is_lower_cased() {
        assert_eq!(source_extension("video.MOV"), "mov");
        assert_eq!(source_extension("video.mp4"), "mp4");
        assert_eq!(source_extension("video."), "bin");
    }

    #[test]
    fn canonical_comparison_is_case_sensitive() {
        // "video.MP4" still gets retired after publishing "video.mp4".
        assert_ne!("video.MP4", CANONICAL_KEY);
        assert_eq!("video.mp4", CANONICAL_KEY);
    }

    // --- Pipeline tests against a fake store ---

    struct FakeStore {
        base_url: String,
        objects: Vec<StoredObject>,
        fail_delete: bool,
        puts: Mutex<Vec<(String, String)>>,
        deletes: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new(base_url: String, keys: &[&str]) -> Self {
            Self {
                base_url,
                objects: keys.iter().map(|k| obj(k)).collect(),
                fail_delete: false,
                puts: Mutex::new(Vec::new()),
                deletes: Mutex::new(Vec::new()),
            }
        }
    }

    impl SlotStore for FakeStore {
        fn public_url(&self, key: &str) -> String {
            format!("{}/{}", self.base_url, key)
        }

        async fn list(&self) -> Result<Vec<StoredObject>> {
            Ok(self.objects.clone())
        }

        async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<()> {
            // Publish must only ever see a fully written output.
            assert!(path.exists());
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string()));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            if self.fail_delete {
                anyhow::bail!("delete refused");
            }
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    struct CopyTranscoder;

    impl Transcoder for CopyTranscoder {
        async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
            tokio::fs::copy(input, output)
                .await
                .map_err(|e| TranscodeError::Process {
                    code: None,
                    detail: e.to_string(),
                })?;
            Ok(())
        }
    }

    struct FailingTranscoder;

    impl Transcoder for FailingTranscoder {
        async fn transcode(&self, _input: &Path, _output: &Path) -> Result<(), TranscodeError> {
            Err(TranscodeError::Process {
                code: Some(1),
                detail: "moov atom not found".into(),
            })
        }
    }

    /// Origin serving the slot video; any other key 404s.
    async fn spawn_origin() -> SocketAddr {
        let app = Router::new()
            .route("/video.mov", get(|| async { "mov bytes" }))
            .route("/video.mp4", get(|| async { "mp4 bytes" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn http_client() -> reqwest::Client {
        download::build_client(Duration::from_secs(5)).unwrap()
    }

    fn scratch_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn empty_slot_is_not_found_and_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FakeStore::new("http://127.0.0.1:9".to_string(), &[]);

        let err =
            TranscodeService::run_pipeline(&store, &http_client(), &FailingTranscoder, tmp.path())
                .await
                .unwrap_err();

        assert!(matches!(err, TranscodeError::NotFound));
        assert_eq!(scratch_entries(tmp.path()), 0);
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_failure_cleans_scratch_and_skips_publish() {
        let addr = spawn_origin().await;
        let tmp = tempfile::tempdir().unwrap();
        // The origin has no route for this key, so the fetch 404s.
        let store = FakeStore::new(format!("http://{}", addr), &["video.avi"]);

        let err =
            TranscodeService::run_pipeline(&store, &http_client(), &CopyTranscoder, tmp.path())
                .await
                .unwrap_err();

        assert!(matches!(err, TranscodeError::Download(_)));
        assert_eq!(scratch_entries(tmp.path()), 0);
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transcoder_failure_cleans_scratch_and_skips_publish() {
        let addr = spawn_origin().await;
        let tmp = tempfile::tempdir().unwrap();
        let store = FakeStore::new(format!("http://{}", addr), &["video.mov"]);

        let err =
            TranscodeService::run_pipeline(&store, &http_client(), &FailingTranscoder, tmp.path())
                .await
                .unwrap_err();

        assert!(matches!(err, TranscodeError::Process { .. }));
        assert_eq!(scratch_entries(tmp.path()), 0);
        assert!(store.puts.lock().unwrap().is_empty());
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_publishes_canonical_key_and_retires_original() {
        let addr = spawn_origin().await;
        let tmp = tempfile::tempdir().unwrap();
        let store = FakeStore::new(format!("http://{}", addr), &["video.mov"]);

        let outcome =
            TranscodeService::run_pipeline(&store, &http_client(), &CopyTranscoder, tmp.path())
                .await
                .unwrap();

        assert_eq!(outcome.key, CANONICAL_KEY);
        assert!(outcome.warning.is_none());
        assert_eq!(
            *store.puts.lock().unwrap(),
            vec![("video.mp4".to_string(), "video/mp4".to_string())]
        );
        assert_eq!(*store.deletes.lock().unwrap(), vec!["video.mov".to_string()]);
        assert_eq!(scratch_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn already_canonical_source_is_not_retired() {
        let addr = spawn_origin().await;
        let tmp = tempfile::tempdir().unwrap();
        let store = FakeStore::new(format!("http://{}", addr), &["video.mp4"]);

        let outcome =
            TranscodeService::run_pipeline(&store, &http_client(), &CopyTranscoder, tmp.path())
                .await
                .unwrap();

        assert!(outcome.warning.is_none());
        assert!(store.deletes.lock().unwrap().is_empty());
        assert_eq!(scratch_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn retire_failure_still_reports_success_with_warning() {
        let addr = spawn_origin().await;
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FakeStore::new(format!("http://{}", addr), &["video.mov"]);
        store.fail_delete = true;

        let outcome =
            TranscodeService::run_pipeline(&store, &http_client(), &CopyTranscoder, tmp.path())
                .await
                .unwrap();

        assert_eq!(outcome.key, CANONICAL_KEY);
        assert!(outcome.warning.as_deref().unwrap().contains("video.mov"));
        assert_eq!(
            *store.puts.lock().unwrap(),
            vec![("video.mp4".to_string(), "video/mp4".to_string())]
        );
        assert_eq!(scratch_entries(tmp.path()), 0);
    }
}
