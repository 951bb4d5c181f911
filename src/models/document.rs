use camino::Utf8PathBuf;
use std::time::SystemTime;

/// Immutable snapshot of the generator config document at one point in time.
///
/// A fresh snapshot is produced by every read and by every successful write;
/// the contents are never mutated in place, which is what makes rollback a
/// matter of dropping the patched string.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentText {
    pub path: Utf8PathBuf,
    pub contents: String,
    pub modified: Option<SystemTime>,
}

impl DocumentText {
    pub fn new(path: Utf8PathBuf, contents: String, modified: Option<SystemTime>) -> Self {
        Self {
            path,
            contents,
            modified,
        }
    }
}
