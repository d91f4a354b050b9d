use std::path::PathBuf;

use layered_theory::DocumentId;
use thiserror::Error;

/// Errors from loading, storing or looking up cached theories.
///
/// The type is `Clone` so that one failed load can be reported to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("no theory stored for document `{0}`")]
    NotFound(DocumentId),

    #[error("failed to load document `{id}`: {message}")]
    Load { id: DocumentId, message: String },

    #[error("failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("failed to store {}: {message}", .path.display())]
    Store { path: PathBuf, message: String },
}
