use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::LOCATION;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use super::error::TranscodeError;

/// Redirect hops followed before the fetch is abandoned.
pub const MAX_REDIRECTS: usize = 5;

/// Client for slot downloads. Automatic redirects are disabled so the hop
/// bound in `download_to_file` stays explicit.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
}

/// Stream the resource at `url` into `dest`, following at most
/// `MAX_REDIRECTS` 3xx responses. The file is synced before returning so the
/// transcoder only ever sees fully written input.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), TranscodeError> {
    let mut current = Url::parse(url)
        .map_err(|e| TranscodeError::Download(format!("invalid url {}: {}", url, e)))?;

    for _ in 0..=MAX_REDIRECTS {
        let response = client
            .get(current.clone())
            .send()
            .await
            .map_err(|e| TranscodeError::Download(e.to_string()))?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    TranscodeError::Download(format!(
                        "{} from {} without a Location header",
                        status, current
                    ))
                })?;

            // Location may be relative; resolve against the current URL.
            current = current.join(location).map_err(|e| {
                TranscodeError::Download(format!("invalid redirect target {}: {}", location, e))
            })?;
            debug!("Following redirect to {}", current);
            continue;
        }

        if !status.is_success() {
            return Err(TranscodeError::Download(format!(
                "{} returned status {}",
                current, status
            )));
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            TranscodeError::Download(format!("cannot create {}: {}", dest.display(), e))
        })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TranscodeError::Download(e.to_string()))?;
            file.write_all(&chunk).await.map_err(|e| {
                TranscodeError::Download(format!("cannot write {}: {}", dest.display(), e))
            })?;
        }

        file.sync_all().await.map_err(|e| {
            TranscodeError::Download(format!("cannot flush {}: {}", dest.display(), e))
        })?;

        return Ok(());
    }

    Err(TranscodeError::Download(format!(
        "more than {} redirects fetching {}",
        MAX_REDIRECTS, url
    )))
}
