//! Where the cache gets theories from on a miss.

use std::fs;
use std::io;
use std::path::PathBuf;

use layered_theory::{DocumentId, DocumentTheory};
use ron::ser::PrettyConfig;
use tracing::debug;

use crate::CacheError;

/// Loads a theory for a document id. Called by [`TheoryCache`](crate::TheoryCache)
/// at most once at a time per id.
///
/// Loads may block on I/O. A loader talking to a slow backend is expected to
/// bound its own wait and report a [`CacheError::Load`] when it gives up.
pub trait TheoryLoader: Send + Sync {
    fn load(&self, id: &DocumentId) -> Result<DocumentTheory, CacheError>;
}

/// Reads theories stored as `<dir>/<document id>.ron`.
#[derive(Debug, Clone)]
pub struct RonDirectoryLoader {
    dir: PathBuf,
}

impl RonDirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &DocumentId) -> Result<PathBuf, CacheError> {
        let name = id.as_str();
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name == "." || name == ".." {
            return Err(CacheError::Load {
                id: id.clone(),
                message: "document id is not a valid file name".to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.ron", name)))
    }

    /// Write `theory` where [`TheoryLoader::load`] will find it.
    pub fn save(&self, theory: &DocumentTheory) -> Result<PathBuf, CacheError> {
        let path = self.path_for(theory.id())?;
        let text = ron::ser::to_string_pretty(theory, PrettyConfig::default()).map_err(|err| {
            CacheError::Store {
                path: path.clone(),
                message: err.to_string(),
            }
        })?;
        fs::write(&path, text).map_err(|err| CacheError::Store {
            path: path.clone(),
            message: err.to_string(),
        })?;
        Ok(path)
    }
}

impl TheoryLoader for RonDirectoryLoader {
    fn load(&self, id: &DocumentId) -> Result<DocumentTheory, CacheError> {
        let path = self.path_for(id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(id.clone()))
            }
            Err(err) => {
                return Err(CacheError::Load {
                    id: id.clone(),
                    message: err.to_string(),
                })
            }
        };

        let theory: DocumentTheory = ron::from_str(&text).map_err(|err| CacheError::Decode {
            path: path.clone(),
            message: err.to_string(),
        })?;
        if theory.id() != id {
            return Err(CacheError::Decode {
                path,
                message: format!("file holds document `{}`", theory.id()),
            });
        }
        debug!(document = %id, path = %path.display(), "loaded theory");
        Ok(theory)
    }
}
