//! Signature compositing
//!
//! Stamps the captured signature onto the first page of the source document,
//! at half its native pixel size, centered on both axes.

use crate::data_uri;
use crate::error::{CompositeError, EMPTY_SIGNATURE_NOTICE};
use crate::pdf::PdfDocument;
use crate::placement::{Placement, SIGNATURE_SCALE};
use crate::store::DocumentStore;
use crate::surface::{SignatureSource, PNG_MIME};
use crate::viewer::Viewer;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Channel for blocking user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Emits notices as warnings in the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        warn!("User notice: {}", message);
    }
}

/// Keeps every notice, in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

/// Result of one composite call
#[derive(Debug, Clone)]
pub struct CompositeOutput {
    pub bytes: Vec<u8>,
    pub placement: Placement,
}

/// Result of a successful "view" action
#[derive(Debug, Clone, Serialize)]
pub struct ViewOutcome {
    pub url: String,
    pub placement: Placement,
    pub size_bytes: usize,
}

/// Embed a PNG `data:` URI onto page 0 of `source` and serialize the result
pub fn composite(signature_url: &str, source: &[u8]) -> Result<CompositeOutput, CompositeError> {
    let mut pdf = PdfDocument::load(source)?;
    let page = pdf.page(0)?;

    let png = data_uri::decode(signature_url)?;
    if png.mime != PNG_MIME {
        return Err(CompositeError::UnsupportedMimeType(png.mime));
    }
    let image = pdf.embed_png(&png.bytes)?;

    let placement = Placement::centered(page.size(), image.scale(SIGNATURE_SCALE));
    if !placement.is_within(page.size()) {
        warn!(
            "Signature {}x{} extends past the {}x{} page at ({:.2}, {:.2})",
            placement.width, placement.height, page.width, page.height, placement.x, placement.y
        );
    }

    pdf.draw_image(&page, &image, &placement)?;
    let bytes = pdf.save()?;

    Ok(CompositeOutput { bytes, placement })
}

/// Clears the in-flight flag when dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Wires a signature source and a document store into the view flow
pub struct Compositor<S, D> {
    signature: S,
    store: D,
    source_path: String,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

/// Run CPU-bound work off the async worker threads
async fn run_blocking<T, F>(job: F) -> Result<T, CompositeError>
where
    F: FnOnce() -> Result<T, CompositeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| CompositeError::Task(e.to_string()))?
}

impl<S, D> Compositor<S, D>
where
    S: SignatureSource + Clone + 'static,
    D: DocumentStore,
{
    pub fn new(signature: S, store: D, source_path: impl Into<String>) -> Self {
        Self {
            signature,
            store,
            source_path: source_path.into(),
            notifier: Arc::new(TracingNotifier),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn signature(&self) -> &S {
        &self.signature
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// True while a view is running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The "clear" action
    pub fn clear(&self) {
        self.signature.clear();
        info!("Signature cleared");
    }

    /// The "view" action: composite the current signature and display it
    ///
    /// Only one view runs at a time; a concurrent call fails with
    /// `InProgress`. Export and compositing run on the blocking pool. On any
    /// failure the viewer keeps its current content.
    pub async fn view(&self, viewer: &Viewer) -> Result<ViewOutcome, CompositeError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(CompositeError::InProgress)?;

        if self.signature.is_empty() {
            self.notifier.notify(EMPTY_SIGNATURE_NOTICE);
            return Err(CompositeError::EmptySignature);
        }

        let signature = self.signature.clone();
        let signature_url = run_blocking(move || signature.to_data_url(PNG_MIME)).await?;
        let source = self.store.fetch(&self.source_path).await?;
        info!(
            "Compositing signature onto {} ({} bytes)",
            self.source_path,
            source.len()
        );

        let output = run_blocking(move || composite(&signature_url, &source)).await?;
        let size_bytes = output.bytes.len();
        let url = viewer.present(output.bytes);

        Ok(ViewOutcome {
            url,
            placement: output.placement,
            size_bytes,
        })
    }
}
