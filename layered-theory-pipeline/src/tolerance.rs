//! The tolerance gate: runs a stage, then checks every constraint it was given
//! against the theory it returned.

use std::sync::atomic::{AtomicU64, Ordering};

use layered_theory::{AnnotationError, Constraint, ConstraintKind, DocumentTheory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Stage;

/// What happens when a stage leaves a constraint unsatisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    /// Log a warning, count the failure and keep the stage's output.
    Tolerant,
    /// Fail the document.
    #[default]
    Intolerant,
}

/// Counters kept by a [`GatedStage`] across every document it sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Times the stage was invoked.
    pub runs: u64,
    /// Runs whose output satisfied every constraint given.
    pub succeeded: u64,
    /// Constraints found satisfied after a run.
    pub satisfied: u64,
    /// Constraints found unsatisfied after a run, tolerated or not.
    pub unsatisfied: u64,
    /// Documents this stage failed.
    pub aborted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    runs: AtomicU64,
    succeeded: AtomicU64,
    satisfied: AtomicU64,
    unsatisfied: AtomicU64,
    aborted: AtomicU64,
}

/// A [`Stage`] together with its tolerance policy and counters.
///
/// Counters are atomic, so one gated stage can serve documents on several
/// worker threads.
pub struct GatedStage {
    stage: Box<dyn Stage>,
    tolerance: Tolerance,
    counters: Counters,
}

impl std::fmt::Debug for GatedStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatedStage")
            .field("stage", &self.stage.name())
            .field("tolerance", &self.tolerance)
            .field("stats", &self.stats())
            .finish()
    }
}

impl GatedStage {
    pub fn new(stage: Box<dyn Stage>, tolerance: Tolerance) -> Self {
        Self {
            stage,
            tolerance,
            counters: Counters::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.stage.name()
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn accepts(&self, kind: ConstraintKind) -> bool {
        self.stage.accepts().contains(&kind)
    }

    pub fn stats(&self) -> StageStats {
        StageStats {
            runs: self.counters.runs.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            satisfied: self.counters.satisfied.load(Ordering::Relaxed),
            unsatisfied: self.counters.unsatisfied.load(Ordering::Relaxed),
            aborted: self.counters.aborted.load(Ordering::Relaxed),
        }
    }

    /// Run the stage and gate its output.
    ///
    /// An unsupported constraint kind fails before the stage runs, whatever
    /// the tolerance. Constraints are checked against the returned theory
    /// only.
    pub fn run(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        if let Some(unsupported) = constraints.iter().find(|c| !self.accepts(c.kind())) {
            self.counters.aborted.fetch_add(1, Ordering::Relaxed);
            return Err(AnnotationError::UnsupportedConstraint {
                stage: self.name().to_string(),
                kind: unsupported.kind(),
            });
        }

        self.counters.runs.fetch_add(1, Ordering::Relaxed);
        debug!(
            stage = self.name(),
            document = %theory.id(),
            constraints = constraints.len(),
            "running stage"
        );

        let output = self.stage.process_constrained(theory, constraints).map_err(|err| {
            self.counters.aborted.fetch_add(1, Ordering::Relaxed);
            err
        })?;

        let mut all_satisfied = true;
        for constraint in constraints {
            if constraint.satisfied_by(&output) {
                self.counters.satisfied.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            all_satisfied = false;
            self.counters.unsatisfied.fetch_add(1, Ordering::Relaxed);
            match self.tolerance {
                Tolerance::Tolerant => {
                    warn!(
                        stage = self.name(),
                        constraint = %constraint,
                        theory = %output,
                        "constraint unsatisfied, continuing"
                    );
                }
                Tolerance::Intolerant => {
                    self.counters.aborted.fetch_add(1, Ordering::Relaxed);
                    return Err(AnnotationError::Unsatisfied {
                        stage: self.name().to_string(),
                        constraint: constraint.to_string(),
                    });
                }
            }
        }

        if all_satisfied {
            self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
        }
        Ok(output)
    }

    /// Log this stage's tallies and call the stage's own `finish` hook.
    pub fn finish(&self) {
        let stats = self.stats();
        info!(
            stage = self.name(),
            runs = stats.runs,
            succeeded = stats.succeeded,
            satisfied = stats.satisfied,
            unsatisfied = stats.unsatisfied,
            aborted = stats.aborted,
            "stage finished"
        );
        self.stage.finish();
    }
}
