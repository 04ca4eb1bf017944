//! Viewer handoff via object URLs
//!
//! A `BlobRegistry` hands out process-local `blob:<uuid>` handles for
//! in-memory byte blobs. A `Viewer` displays one handle at a time and revokes
//! the previous handle whenever it is given a new one, and its current handle
//! on drop, so handles never accumulate.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub const PDF_MIME: &str = "application/pdf";
const OBJECT_URL_SCHEME: &str = "blob:";

/// Typed binary content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub bytes: Arc<Vec<u8>>,
}

impl Blob {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Shared table of live object URLs
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    blobs: Arc<RwLock<HashMap<Uuid, Blob>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return its `blob:<uuid>` handle
    pub fn create_object_url(&self, blob: Blob) -> String {
        let id = Uuid::new_v4();
        self.blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, blob);
        format!("{}{}", OBJECT_URL_SCHEME, id)
    }

    /// Look up a live handle; accepts either `blob:<uuid>` or the bare uuid
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        let id = parse_object_url(url)?;
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
    }

    /// Release a handle; returns false if it was not live
    pub fn revoke_object_url(&self, url: &str) -> bool {
        let Some(id) = parse_object_url(url) else {
            return false;
        };
        self.blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id)
            .is_some()
    }

    /// Number of live handles
    pub fn live_count(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn parse_object_url(url: &str) -> Option<Uuid> {
    let raw = url.strip_prefix(OBJECT_URL_SCHEME).unwrap_or(url);
    Uuid::parse_str(raw).ok()
}

/// Display region that shows one document handle at a time
#[derive(Debug)]
pub struct Viewer {
    registry: BlobRegistry,
    src: RwLock<Option<String>>,
}

impl Viewer {
    pub fn new(registry: BlobRegistry) -> Self {
        Self {
            registry,
            src: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &BlobRegistry {
        &self.registry
    }

    /// The handle currently displayed
    pub fn src(&self) -> Option<String> {
        self.src
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Wrap `bytes` as a PDF blob, display it, and release the previous handle
    pub fn present(&self, bytes: Vec<u8>) -> String {
        let size = bytes.len();
        let url = self.registry.create_object_url(Blob::new(PDF_MIME, bytes));

        let previous = self
            .src
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(url.clone());

        if let Some(previous) = previous {
            self.registry.revoke_object_url(&previous);
            tracing::debug!("Revoked previous viewer handle {}", previous);
        }

        tracing::info!("Viewer now showing {} ({} bytes)", url, size);
        url
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        let current = self
            .src
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(url) = current {
            self.registry.revoke_object_url(&url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_round_trip() {
        let registry = BlobRegistry::new();
        let url = registry.create_object_url(Blob::new(PDF_MIME, b"%PDF".to_vec()));
        assert!(url.starts_with("blob:"));

        let blob = registry.resolve(&url).unwrap();
        assert_eq!(blob.mime, "application/pdf");
        assert_eq!(blob.bytes.as_slice(), b"%PDF");

        // Bare id resolves too
        let bare = url.trim_start_matches("blob:");
        assert!(registry.resolve(bare).is_some());
    }

    #[test]
    fn test_revoke_releases_blob() {
        let registry = BlobRegistry::new();
        let url = registry.create_object_url(Blob::new(PDF_MIME, vec![1]));
        assert!(registry.revoke_object_url(&url));
        assert!(registry.resolve(&url).is_none());
        assert!(!registry.revoke_object_url(&url));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_garbage_url_does_not_resolve() {
        let registry = BlobRegistry::new();
        assert!(registry.resolve("blob:not-a-uuid").is_none());
        assert!(!registry.revoke_object_url("https://example.com"));
    }

    #[test]
    fn test_present_releases_previous_handle() {
        let registry = BlobRegistry::new();
        let viewer = Viewer::new(registry.clone());
        assert!(viewer.src().is_none());

        let first = viewer.present(vec![1, 2, 3]);
        let second = viewer.present(vec![4, 5, 6]);

        assert_ne!(first, second);
        assert_eq!(viewer.src(), Some(second.clone()));
        assert!(registry.resolve(&first).is_none());
        assert_eq!(registry.resolve(&second).unwrap().bytes.as_slice(), &[4, 5, 6]);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_drop_releases_current_handle() {
        let registry = BlobRegistry::new();
        let url = {
            let viewer = Viewer::new(registry.clone());
            viewer.present(vec![9])
        };
        assert!(registry.resolve(&url).is_none());
        assert_eq!(registry.live_count(), 0);
    }
}
