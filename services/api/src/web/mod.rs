pub mod dto;
pub mod extract;
pub mod periods;
pub mod rest;
pub mod school;
pub mod state;
pub mod timetable;

use crate::config::{Config, ConfigError};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application: REST routes with CORS and request
/// tracing, merged with the Swagger UI.
pub fn build_app(app_state: Arc<AppState>, config: &Config) -> Result<Router, ConfigError> {
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let api_router = rest::api_routes(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
