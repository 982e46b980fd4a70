use dotenvy::dotenv;
use tracing::info;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting server...");

    let config = config::settings::AppConfig::new()
        .expect("Missing required environment variables");

    let storage = infrastructure::storage::s3::StorageService::new(
        &config.s3_endpoint,
        &config.s3_bucket,
        &config.s3_access_key,
        &config.s3_secret_key,
        &config.public_base_url,
    );

    let http = modules::transcode::download::build_client(std::time::Duration::from_secs(
        config.download_timeout_secs,
    ))
    .expect("Failed to build HTTP client");

    let port = config.server_port;
    let state = state::AppState::new(config, storage, http);

    let app = app::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind");
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await.expect("Server error");
}
