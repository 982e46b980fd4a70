use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// Temp files owned by a single pipeline run. Every allocated path is
/// tracked so `cleanup` can remove whatever was actually written, on every
/// exit path. One failed removal does not stop the others.
pub struct ScratchSpace {
    dir: PathBuf,
    allocated: Vec<PathBuf>,
}

impl ScratchSpace {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            allocated: Vec::new(),
        }
    }

    /// Unique path per invocation, so concurrent runs cannot collide.
    pub fn allocate(&mut self, label: &str, extension: &str) -> PathBuf {
        let name = format!(
            "vidslot_{}_{}.{}",
            label,
            Uuid::new_v4().as_simple(),
            extension
        );
        let path = self.dir.join(name);
        self.allocated.push(path.clone());
        path
    }

    /// Drains the tracked list, so the drop guard below has nothing left to
    /// remove on the normal paths.
    pub async fn cleanup(&mut self) {
        for path in std::mem::take(&mut self.allocated) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
    }
}

/// Last-resort release for a run whose future was dropped mid-pipeline
/// (client disconnect cancels the handler). Anything still tracked gets a
/// best-effort blocking removal.
impl Drop for ScratchSpace {
    fn drop(&mut self) {
        for path in self.allocated.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
    }
}
