use crate::models::DocumentText;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::time::SystemTime;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Default file name of the generator config document.
pub const DEFAULT_DOCUMENT_NAME: &str = "quartz.config.ts";

/// Errors at the filesystem boundary. Reported immediately, never retried;
/// the orchestrator decides whether to surface them to the user.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read document at {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write document at {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Project root {0} has no parent directory")]
    NoParentDirectory(Utf8PathBuf),
}

/// Read/write access to the external config document.
///
/// A trait seam so the sync pipeline can be exercised against a mock store
/// (the atomic-rejection guarantee is proved by asserting `write` is never
/// called on a validation failure).
#[cfg_attr(test, automock)]
pub trait DocumentStore {
    /// Full text of the document, or `Ok(None)` when it does not exist.
    /// "Not yet scaffolded" is an expected state, not an error.
    fn read(&self) -> Result<Option<DocumentText>, StoreError>;

    /// Overwrite the document. Either the whole new text lands or the call
    /// fails with the prior on-disk content unchanged.
    fn write(&self, text: &str) -> Result<DocumentText, StoreError>;

    fn exists(&self) -> bool;

    fn last_modified(&self) -> Result<Option<SystemTime>, StoreError>;
}

/// Filesystem-backed store. The document lives at a fixed file name one
/// directory level above the managed project root.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    document_path: Utf8PathBuf,
}

impl FsDocumentStore {
    /// Resolve the document location from the managed project root.
    pub fn new<P: AsRef<Utf8Path>>(project_root: P, file_name: &str) -> Result<Self, StoreError> {
        let root = project_root.as_ref();
        let parent = root
            .parent()
            .ok_or_else(|| StoreError::NoParentDirectory(root.to_path_buf()))?;

        Ok(Self {
            document_path: parent.join(file_name),
        })
    }

    /// A store addressing an explicit document path, bypassing sibling
    /// resolution. Used by tests and by callers that already know the path.
    pub fn at_path<P: AsRef<Utf8Path>>(document_path: P) -> Self {
        Self {
            document_path: document_path.as_ref().to_path_buf(),
        }
    }

    pub fn document_path(&self) -> &Utf8Path {
        &self.document_path
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self) -> Result<Option<DocumentText>, StoreError> {
        if !self.document_path.exists() {
            tracing::debug!("Document not found at {}", self.document_path);
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.document_path).map_err(|source| {
            StoreError::Read {
                path: self.document_path.clone(),
                source,
            }
        })?;

        let modified = fs::metadata(&self.document_path)
            .and_then(|m| m.modified())
            .ok();

        tracing::debug!(
            "Read document from {} ({} bytes)",
            self.document_path,
            contents.len()
        );

        Ok(Some(DocumentText::new(
            self.document_path.clone(),
            contents,
            modified,
        )))
    }

    fn write(&self, text: &str) -> Result<DocumentText, StoreError> {
        // Write to a temporary sibling and rename so a failure mid-write
        // never leaves a truncated document behind.
        let tmp_path = Utf8PathBuf::from(format!("{}.tmp", self.document_path));

        fs::write(&tmp_path, text).map_err(|source| StoreError::Write {
            path: tmp_path.clone(),
            source,
        })?;

        fs::rename(&tmp_path, &self.document_path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Write {
                path: self.document_path.clone(),
                source,
            }
        })?;

        let modified = fs::metadata(&self.document_path)
            .and_then(|m| m.modified())
            .ok();

        tracing::info!(
            "Wrote document to {} ({} bytes)",
            self.document_path,
            text.len()
        );

        Ok(DocumentText::new(
            self.document_path.clone(),
            text.to_string(),
            modified,
        ))
    }

    fn exists(&self) -> bool {
        self.document_path.exists()
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, StoreError> {
        if !self.document_path.exists() {
            return Ok(None);
        }

        let modified = fs::metadata(&self.document_path)
            .and_then(|m| m.modified())
            .map_err(|source| StoreError::Read {
                path: self.document_path.clone(),
                source,
            })?;

        Ok(Some(modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in_temp_dir() -> (FsDocumentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let store = FsDocumentStore::at_path(base.join(DEFAULT_DOCUMENT_NAME));
        (store, temp_dir)
    }

    #[test]
    fn test_read_missing_is_none_not_error() {
        let (store, _temp_dir) = store_in_temp_dir();
        assert!(store.read().unwrap().is_none());
        assert!(!store.exists());
        assert!(store.last_modified().unwrap().is_none());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let (store, _temp_dir) = store_in_temp_dir();

        let written = store.write("const config = {};\n").unwrap();
        assert_eq!(written.contents, "const config = {};\n");

        let read = store.read().unwrap().unwrap();
        assert_eq!(read.contents, "const config = {};\n");
        assert!(store.exists());
        assert!(store.last_modified().unwrap().is_some());
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let (store, temp_dir) = store_in_temp_dir();
        store.write("x").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_sibling_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let project_root = base.join("content");
        std::fs::create_dir_all(&project_root).unwrap();

        let store = FsDocumentStore::new(&project_root, DEFAULT_DOCUMENT_NAME).unwrap();
        assert_eq!(
            store.document_path(),
            base.join(DEFAULT_DOCUMENT_NAME).as_path()
        );
    }
}
