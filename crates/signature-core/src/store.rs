//! Source document retrieval

use crate::error::CompositeError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Read-only access to the source documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the raw bytes at a relative `path`
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, CompositeError>;
}

/// Documents on disk under a root directory
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, refusing anything that escapes it
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || !contained {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, CompositeError> {
        let full = self
            .resolve(path)
            .ok_or_else(|| CompositeError::SourceNotFound(path.to_string()))?;

        match tokio::fs::read(&full).await {
            Ok(bytes) => {
                tracing::debug!("Read {} bytes from {}", bytes.len(), full.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CompositeError::SourceNotFound(path.to_string()))
            }
            Err(e) => Err(CompositeError::SourceIo(e)),
        }
    }
}

/// In-memory documents keyed by path; counts every fetch
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.into(), bytes);
    }

    /// Number of `fetch` calls so far, including failed ones
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, CompositeError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| CompositeError::SourceNotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "signature-core-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_file_store_reads_relative_path() {
        let root = temp_root("read");
        std::fs::write(root.join("cover-letter.pdf"), b"%PDF-1.7").unwrap();

        let store = FileDocumentStore::new(&root);
        let bytes = store.fetch("cover-letter.pdf").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn test_file_store_missing_is_not_found() {
        let root = temp_root("missing");
        let store = FileDocumentStore::new(&root);
        let err = store.fetch("cover-letter.pdf").await.unwrap_err();
        assert!(matches!(err, CompositeError::SourceNotFound(p) if p == "cover-letter.pdf"));
        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn test_file_store_refuses_escape() {
        let store = FileDocumentStore::new("/tmp");
        for path in ["../etc/passwd", "/etc/passwd", "docs/../../secret.pdf", ""] {
            let err = store.fetch(path).await.unwrap_err();
            assert!(
                matches!(err, CompositeError::SourceNotFound(_)),
                "{} should be refused",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_memory_store_counts_fetches() {
        let store = MemoryDocumentStore::new().with_document("a.pdf", vec![1, 2, 3]);
        assert_eq!(store.fetch_count(), 0);

        assert_eq!(store.fetch("a.pdf").await.unwrap(), vec![1, 2, 3]);
        assert!(store.fetch("b.pdf").await.is_err());
        assert_eq!(store.fetch_count(), 2);
    }
}
