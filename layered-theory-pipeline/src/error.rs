//! Errors surfaced by the driver and by configuration loading.

use std::path::PathBuf;

use layered_theory::{AnnotationError, DocumentId};
use thiserror::Error;

/// A document that could not be processed, with the context needed to log it
/// and move on to the next one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("document `{document_id}` failed in stage `{stage}`: {error}")]
pub struct DocumentFailure {
    pub document_id: DocumentId,
    pub stage: String,
    #[source]
    pub error: AnnotationError,
}

/// Errors raised while loading a [`PipelineConfig`](crate::PipelineConfig) or
/// wiring a pipeline from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown stage `{0}`")]
    UnknownStage(String),

    #[error("stage `{0}` is configured more than once")]
    DuplicateStage(String),
}
