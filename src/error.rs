//! Error taxonomy shared by every stage and algorithm.

use thiserror::Error;

use crate::ConstraintKind;

/// Errors raised while building or checking annotations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    /// A stage was handed a constraint variant it does not understand.
    #[error("stage `{stage}` does not accept {kind} constraints")]
    UnsupportedConstraint { stage: String, kind: ConstraintKind },

    /// A constraint that can never be realised as stated.
    #[error("malformed constraint {constraint}: {reason}")]
    MalformedConstraint { constraint: String, reason: String },

    /// A stage produced a theory that does not satisfy a supplied constraint.
    #[error("stage `{stage}` left constraint unsatisfied: {constraint}")]
    Unsatisfied { stage: String, constraint: String },

    /// The requested identifier or exact-boundary node does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A built structure failed its own consistency checks.
    #[error("structural invariant violated: {0}")]
    StructuralInvariant(String),
}

/// Coarse classification used by the tolerance gate and the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    ConstraintUnsatisfied,
    NotFound,
    StructuralInvariantViolation,
}

impl AnnotationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnnotationError::UnsupportedConstraint { .. }
            | AnnotationError::MalformedConstraint { .. } => ErrorKind::Configuration,
            AnnotationError::Unsatisfied { .. } => ErrorKind::ConstraintUnsatisfied,
            AnnotationError::NotFound(_) => ErrorKind::NotFound,
            AnnotationError::StructuralInvariant(_) => ErrorKind::StructuralInvariantViolation,
        }
    }

    /// Only an unsatisfied constraint may be tolerated, and only by a tolerant stage.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::ConstraintUnsatisfied
    }
}
