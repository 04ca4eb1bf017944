//! Application state for the signature viewer

use signature_core::{
    BlobRegistry, Compositor, FileDocumentStore, SharedSignaturePad, SignaturePad, Viewer,
};
use std::path::PathBuf;

pub type AppCompositor = Compositor<SharedSignaturePad, FileDocumentStore>;

/// Runtime settings, resolved from CLI flags and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub document_root: PathBuf,
    pub source_document: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub pen_width: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("."),
            source_document: "cover-letter.pdf".to_string(),
            canvas_width: 400,
            canvas_height: 200,
            pen_width: 2.5,
        }
    }
}

/// Shared state for one signing session
///
/// The server holds a single pad and a single viewer, so every client sees the
/// same signature and document. A clear or view from one client replaces what
/// any other client drew or displayed.
pub struct AppState {
    pub pad: SharedSignaturePad,
    pub compositor: AppCompositor,
    pub registry: BlobRegistry,
    pub viewer: Viewer,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        tracing::info!(
            "Serving {} from {} on a {}x{} canvas",
            config.source_document,
            config.document_root.display(),
            config.canvas_width,
            config.canvas_height
        );

        let pad = SharedSignaturePad::new(
            SignaturePad::new(config.canvas_width, config.canvas_height)
                .with_pen_width(config.pen_width),
        );
        let store = FileDocumentStore::new(&config.document_root);
        let compositor = Compositor::new(pad.clone(), store, config.source_document.clone());
        let registry = BlobRegistry::new();
        let viewer = Viewer::new(registry.clone());

        Self {
            pad,
            compositor,
            registry,
            viewer,
        }
    }
}
