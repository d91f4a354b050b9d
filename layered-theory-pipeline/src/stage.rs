use layered_theory::{AnnotationError, Constraint, ConstraintKind, DocumentTheory};

/// One annotation layer.
///
/// A stage is a pure transformation from the previous theory (plus the
/// constraints addressed to it) to a new theory. It never mutates its input;
/// it derives a builder and returns what the builder produces.
///
/// Stages do not check their own output against the constraints. The
/// [`GatedStage`](crate::GatedStage) wrapping every stage in a pipeline does
/// that, and applies the configured [`Tolerance`](crate::Tolerance).
pub trait Stage: Send + Sync {
    /// Name used in configuration, constraint routing and log records.
    fn name(&self) -> &str;

    /// Constraint kinds this stage knows how to realise.
    ///
    /// Stages that take no constraints keep the default; handing them any
    /// constraint is a configuration error.
    fn accepts(&self) -> &[ConstraintKind] {
        &[]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError>;

    fn process(&self, theory: &DocumentTheory) -> Result<DocumentTheory, AnnotationError> {
        self.process_constrained(theory, &[])
    }

    /// Called once at the end of a run. Diagnostic only.
    fn finish(&self) {}
}
