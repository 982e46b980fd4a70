use crate::config::settings::AppConfig;
use crate::infrastructure::storage::s3::StorageService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: StorageService,
    /// Outbound client for slot downloads; redirects are handled manually.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, storage: StorageService, http: reqwest::Client) -> Self {
        Self {
            config,
            storage,
            http,
        }
    }
}
