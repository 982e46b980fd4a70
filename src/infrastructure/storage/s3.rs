use std::path::Path;
use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// Read-only view of an object in the bucket.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    /// Milliseconds since epoch.
    pub last_modified: Option<u64>,
}

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
    public_base_url: String,
}

impl StorageService {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        public_base_url: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        let client = Client::from_conf(config);

        info!("✅ Connected to S3 (MinIO)");

        Self {
            client,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL the object can be fetched from without credentials.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    pub async fn list(&self) -> Result<Vec<StoredObject>, aws_sdk_s3::Error> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await?;

            for obj in response.contents() {
                objects.push(StoredObject {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: object_size(obj.size()),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| t.to_millis().ok())
                        .and_then(|ms| u64::try_from(ms).ok()),
                });
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(String::from);
            } else {
                break;
            }
        }

        Ok(objects)
    }

    pub async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), anyhow::Error> {
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path).await?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        info!("⬆️ Uploaded {} as {}", path.display(), key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), aws_sdk_s3::Error> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        Ok(())
    }

    /// Presigned PUT URL clients upload through directly.
    pub async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, anyhow::Error> {
        let presign_config = PresigningConfig::expires_in(expires_in)?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presign_config)
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        Ok(presigned.uri().to_string())
    }
}

/// The listing API reports sizes as `Option<i64>`; a missing or negative
/// value from a misbehaving store reads as zero, never wraps.
fn object_size(raw: Option<i64>) -> u64 {
    raw.and_then(|s| u64::try_from(s).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_size_never_wraps() {
        assert_eq!(object_size(Some(42)), 42);
        assert_eq!(object_size(Some(0)), 0);
        assert_eq!(object_size(Some(-1)), 0);
        assert_eq!(object_size(None), 0);
    }
}
