//! Request and response bodies

use serde::{Deserialize, Serialize};
use signature_core::{Placement, Point, SignaturePad, Stroke};

/// Current state of the capture surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureState {
    pub empty: bool,
    pub width: u32,
    pub height: u32,
    pub pen_width: f32,
    pub strokes: Vec<Stroke>,
}

impl From<&SignaturePad> for SignatureState {
    fn from(pad: &SignaturePad) -> Self {
        Self {
            empty: pad.is_empty(),
            width: pad.width(),
            height: pad.height(),
            pen_width: pad.pen_width(),
            strokes: pad.strokes().to_vec(),
        }
    }
}

/// One stroke drawn on the client canvas
#[derive(Debug, Clone, Deserialize)]
pub struct StrokeRequest {
    pub points: Vec<Point>,
}

/// Result of the "view" action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewResponse {
    /// Path the display region loads the document from
    pub url: String,
    /// Object URL handle of the displayed document
    pub handle: String,
    pub placement: Placement,
    #[serde(rename = "sizeBytes")]
    pub size_bytes: usize,
}
