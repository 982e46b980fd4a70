use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use axum::http::HeaderValue;
use axum::Router;
use crate::state::AppState;

use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub fn configure_routes(state: &AppState) -> Router<AppState> {
    let cors = build_cors(&state.config.allowed_origins);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api_routes())
        .nest("/api/v1/media", crate::modules::media::router())
        .nest("/api/v1/transcode", crate::modules::transcode::router())
        .layer(cors)
}

fn api_routes() -> Router<AppState> {
    Router::new().route("/health", axum::routing::get(|| async { "ok" }))
}

fn build_cors(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
