use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    S3Endpoint,
    S3Bucket,
    S3AccessKey,
    S3SecretKey,
    PublicBaseUrl,
    AllowedOrigins,
    UploadUrlTtl,
    FfmpegTimeout,
    DownloadTimeout,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
            EnvKey::S3Bucket => "S3_BUCKET",
            EnvKey::S3AccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::S3SecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::PublicBaseUrl => "PUBLIC_BASE_URL",
            EnvKey::AllowedOrigins => "ALLOWED_ORIGINS",
            EnvKey::UploadUrlTtl => "UPLOAD_URL_TTL_SECS",
            EnvKey::FfmpegTimeout => "FFMPEG_TIMEOUT_SECS",
            EnvKey::DownloadTimeout => "DOWNLOAD_TIMEOUT_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
