use serde::Deserialize;
use crate::config::env::{self, EnvKey};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub s3_endpoint: String,
    pub s3_bucket: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    /// Base URL objects are publicly reachable under (bucket website or CDN).
    pub public_base_url: String,
    /// Comma-separated list of allowed CORS origins, or "*".
    pub allowed_origins: String,
    pub upload_url_ttl_secs: u64,
    pub ffmpeg_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            s3_endpoint: env::get(EnvKey::S3Endpoint)?,
            s3_bucket: env::get(EnvKey::S3Bucket)?,
            s3_access_key: env::get(EnvKey::S3AccessKey)?,
            s3_secret_key: env::get(EnvKey::S3SecretKey)?,
            public_base_url: env::get(EnvKey::PublicBaseUrl)?,
            allowed_origins: env::get_or(EnvKey::AllowedOrigins, "*"),
            upload_url_ttl_secs: env::get_parsed(EnvKey::UploadUrlTtl, 900),
            ffmpeg_timeout_secs: env::get_parsed(EnvKey::FfmpegTimeout, 3600),
            download_timeout_secs: env::get_parsed(EnvKey::DownloadTimeout, 300),
        })
    }
}
