//! HTTP handlers for the signature viewer

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::Html,
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Upper bound on points in a single submitted stroke
pub const MAX_STROKE_POINTS: usize = 2_048;

/// Upper bound on points held by the pad across all strokes
pub const MAX_PAD_POINTS: usize = 8_192;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Capture page with the canvas, the two actions and the display region
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn get_signature(State(state): State<Arc<AppState>>) -> Json<SignatureState> {
    Json(SignatureState::from(&*state.pad.lock()))
}

/// Append one stroke to the surface
pub async fn add_stroke(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StrokeRequest>,
) -> Result<Json<SignatureState>, ApiError> {
    if req.points.len() > MAX_STROKE_POINTS {
        return Err(ApiError::InvalidRequest(format!(
            "Stroke exceeds {} points",
            MAX_STROKE_POINTS
        )));
    }

    let mut pad = state.pad.lock();
    if pad.point_count() + req.points.len() > MAX_PAD_POINTS {
        return Err(ApiError::InvalidRequest(format!(
            "Signature exceeds {} points; clear it and draw again",
            MAX_PAD_POINTS
        )));
    }
    if !pad.add_stroke(req.points) {
        return Err(ApiError::InvalidRequest(
            "Stroke must have at least one point".into(),
        ));
    }
    tracing::debug!("Stroke added ({} total)", pad.strokes().len());
    Ok(Json(SignatureState::from(&*pad)))
}

/// The "clear" action
pub async fn clear_signature(State(state): State<Arc<AppState>>) -> Json<SignatureState> {
    state.compositor.clear();
    Json(SignatureState::from(&*state.pad.lock()))
}

/// The "view" action
pub async fn view(State(state): State<Arc<AppState>>) -> Result<Json<ViewResponse>, ApiError> {
    let outcome = state.compositor.view(&state.viewer).await?;

    let id = outcome.url.trim_start_matches("blob:").to_string();
    Ok(Json(ViewResponse {
        url: format!("/api/blob/{}", id),
        handle: outcome.url,
        placement: outcome.placement,
        size_bytes: outcome.size_bytes,
    }))
}

/// Serve a live document handle inline
pub async fn get_blob(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(header::HeaderName, String); 2], Vec<u8>), ApiError> {
    let blob = state
        .registry
        .resolve(&id)
        .ok_or_else(|| ApiError::BlobNotFound(id.clone()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.mime.clone()),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"signed.pdf\"".to_string(),
            ),
        ],
        blob.bytes.as_ref().clone(),
    ))
}
