use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::TranscodeError;

/// Ceiling on buffered stderr, against pathological transcoder output.
const MAX_DIAG_BYTES: usize = 10 * 1024 * 1024;

/// How much diagnostic tail travels with a failure.
const DIAG_TAIL_BYTES: usize = 4096;

/// Fixed argument template: video stream copied untouched, audio re-encoded
/// to AAC at 192 kbps, output overwritten if present.
pub fn ffmpeg_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Run ffmpeg over the input file. Spawn failure, timeout and non-zero exit
/// all surface as the same process error.
pub async fn transcode(
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<(), TranscodeError> {
    let args = ffmpeg_args(input, output);
    debug!("Running ffmpeg {}", args.join(" "));

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TranscodeError::Process {
            code: None,
            detail: format!("failed to spawn ffmpeg: {}", e),
        })?;

    // Drain stderr concurrently so a chatty transcoder never fills the pipe
    // and deadlocks the wait below.
    let stderr = child.stderr.take();
    let diag_task = tokio::spawn(async move {
        let mut diag = String::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.contains("time=") {
                    debug!("ffmpeg progress: {}", line.trim());
                }
                if diag.len() + line.len() < MAX_DIAG_BYTES {
                    diag.push_str(&line);
                    diag.push('\n');
                }
            }
        }
        diag
    });

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(waited) => waited.map_err(|e| TranscodeError::Process {
            code: None,
            detail: format!("failed waiting on ffmpeg: {}", e),
        })?,
        Err(_) => {
            warn!("ffmpeg exceeded {}s, killing process", timeout.as_secs());
            let _ = child.kill().await;
            return Err(TranscodeError::Process {
                code: None,
                detail: format!("transcoder timed out after {}s", timeout.as_secs()),
            });
        }
    };

    let diag = diag_task.await.unwrap_or_default();

    if status.success() {
        Ok(())
    } else {
        Err(TranscodeError::Process {
            code: status.code(),
            detail: tail(&diag, DIAG_TAIL_BYTES),
        })
    }
}

fn tail(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.trim_end().to_string();
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].trim_end().to_string()
}
