//! Signature viewer - HTTP adapter for the signature compositor
//!
//! Provides REST endpoints for:
//! - Drawing and clearing the signature surface
//! - The "view" action that stamps the signature onto the source PDF
//! - Serving the stamped document through its object URL

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::{AppState, Config};

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Capture surface
        .route("/api/signature", get(handlers::get_signature))
        .route("/api/signature/strokes", post(handlers::add_stroke))
        .route("/api/signature/clear", post(handlers::clear_signature))
        // Compositing and display
        .route("/api/view", post(handlers::view))
        .route("/api/blob/:id", get(handlers::get_blob))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
