//! Signature compositing core
//!
//! Captures a hand-drawn signature, stamps it onto the first page of a PDF,
//! and hands the result to a viewer through a temporary object URL.
//!
//! The pieces are wired by dependency injection:
//! - `SignatureSource`: the capture surface (`SignaturePad`)
//! - `DocumentStore`: where the source PDF comes from
//! - `Viewer`: the display region, backed by a `BlobRegistry`
//! - `Compositor`: runs the view flow with a single-flight guard

pub mod compositor;
pub mod data_uri;
pub mod error;
pub mod image;
pub mod pdf;
pub mod placement;
pub mod store;
pub mod surface;
pub mod viewer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use compositor::{
    composite, CompositeOutput, Compositor, Notifier, RecordingNotifier, TracingNotifier,
    ViewOutcome,
};
pub use error::{CompositeError, EMPTY_SIGNATURE_NOTICE};
pub use pdf::{ImageHandle, PdfDocument, PdfPage};
pub use placement::{Dimensions, Placement, SIGNATURE_SCALE};
pub use store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use surface::{Point, SharedSignaturePad, SignaturePad, SignatureSource, Stroke, PNG_MIME};
pub use viewer::{Blob, BlobRegistry, Viewer, PDF_MIME};
