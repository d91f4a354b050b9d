use layered_theory::DocumentTheory;

use crate::DocumentFailure;

/// Receives the output of a pipeline run.
///
/// `consume` is called once per fully processed document and
/// `document_failed` once per document that was aborted, in input order.
/// `finish` is called once after the last document.
pub trait Sink {
    fn consume(&mut self, theory: DocumentTheory);

    fn document_failed(&mut self, _failure: &DocumentFailure) {}

    fn finish(&mut self) {}
}

/// Keeps every theory and failure in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub theories: Vec<DocumentTheory>,
    pub failures: Vec<DocumentFailure>,
    finished: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Sink for CollectingSink {
    fn consume(&mut self, theory: DocumentTheory) {
        self.theories.push(theory);
    }

    fn document_failed(&mut self, failure: &DocumentFailure) {
        self.failures.push(failure.clone());
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
