// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{email, health, html},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (html, email, health).
/// * Applies global middleware (Trace, CORS, body limit).
/// * Injects global state (Config).
pub fn create_router(state: AppState) -> Router {
    // Origins that fail to parse as header values are skipped.
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let html_routes = Router::new()
        .route("/normalize", post(html::normalize_html))
        .route("/images", post(html::list_images))
        .route("/analyze", post(html::analyze_html));

    let email_routes = Router::new().route("/prepare", post(email::prepare_email));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/html", html_routes)
        .nest("/api/email", email_routes)
        .fallback(health::not_found)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(state.config.max_body_bytes)),
        )
        .with_state(state)
}
