//! Built-in constraint-driven stages.
//!
//! Each stage realises the constraints it accepts as far as the current theory
//! allows and leaves the rest for the tolerance gate to report. A constraint a
//! stage cannot place (no matching token boundaries, a conflicting annotation
//! already present) is skipped with a `debug!` record, never forced.

use std::collections::BTreeMap;

use layered_theory::{
    AnnotationError, Constraint, DocumentTheory, DocumentTheoryBuilder, OffsetRange,
    SentenceTheoryBuilder,
};

mod entities;
mod events;
mod mentions;
mod names;
mod parser;
mod relations;
mod sentences;

pub use entities::ConstrainedEntityFinder;
pub use events::ConstrainedEventFinder;
pub use mentions::ConstrainedMentionFinder;
pub use names::ConstrainedNameFinder;
pub use parser::ConstrainedParser;
pub use relations::ConstrainedRelationFinder;
pub use sentences::SentenceSegmenter;

use crate::Stage;

/// Stage names in the order a full pipeline runs them.
pub const STANDARD_ORDER: [&str; 7] = [
    SentenceSegmenter::NAME,
    ConstrainedNameFinder::NAME,
    ConstrainedParser::NAME,
    ConstrainedMentionFinder::NAME,
    ConstrainedEntityFinder::NAME,
    ConstrainedRelationFinder::NAME,
    ConstrainedEventFinder::NAME,
];

/// The built-in stage registered under `name`.
pub fn by_name(name: &str) -> Option<Box<dyn Stage>> {
    let stage: Box<dyn Stage> = match name {
        SentenceSegmenter::NAME => Box::new(SentenceSegmenter::new()),
        ConstrainedNameFinder::NAME => Box::new(ConstrainedNameFinder),
        ConstrainedParser::NAME => Box::new(ConstrainedParser::new()),
        ConstrainedMentionFinder::NAME => Box::new(ConstrainedMentionFinder),
        ConstrainedEntityFinder::NAME => Box::new(ConstrainedEntityFinder),
        ConstrainedRelationFinder::NAME => Box::new(ConstrainedRelationFinder),
        ConstrainedEventFinder::NAME => Box::new(ConstrainedEventFinder),
        _ => return None,
    };
    Some(stage)
}

/// Sentence builders opened on first edit and written back in one go.
///
/// Sentences that are never touched stay shared with the input theory.
struct SentenceEdits {
    builders: BTreeMap<usize, SentenceTheoryBuilder>,
}

impl SentenceEdits {
    fn new() -> Self {
        Self {
            builders: BTreeMap::new(),
        }
    }

    fn sentence(&mut self, theory: &DocumentTheory, index: usize) -> &mut SentenceTheoryBuilder {
        self.builders
            .entry(index)
            .or_insert_with(|| theory.sentences()[index].to_builder())
    }

    fn apply(self, builder: &mut DocumentTheoryBuilder) {
        for (index, sentence) in self.builders {
            builder.replace_sentence(index, sentence.build());
        }
    }
}

/// Index of the sentence containing `range`.
fn sentence_index(theory: &DocumentTheory, range: OffsetRange) -> Option<usize> {
    theory
        .sentences()
        .iter()
        .position(|sentence| sentence.char_range().contains(&range))
}

/// Error for a constraint variant `stage` does not realise.
fn unsupported(stage: &str, constraint: &Constraint) -> AnnotationError {
    AnnotationError::UnsupportedConstraint {
        stage: stage.to_string(),
        kind: constraint.kind(),
    }
}
