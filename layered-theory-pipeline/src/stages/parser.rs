use layered_theory::{
    AnnotationError, Constraint, ConstraintKind, DocumentTheory, MinimalTreeBuilder,
    ParseSpanConstraint,
};
use tracing::debug;

use super::{sentence_index, unsupported, SentenceEdits};
use crate::Stage;

/// Gives every sentence the minimal tree realising the `ExactParseSpan`
/// constraints that fall inside it.
///
/// A sentence without constraints gets the flat default tree. A span that
/// leaves every sentence (including one straddling a sentence boundary) is
/// malformed, and crossing spans are a structural error; neither is subject to
/// tolerance.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedParser {
    builder: MinimalTreeBuilder,
}

impl ConstrainedParser {
    pub const NAME: &'static str = "parser";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: MinimalTreeBuilder) -> Self {
        Self { builder }
    }
}

impl Stage for ConstrainedParser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactParseSpan]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut per_sentence: Vec<Vec<ParseSpanConstraint>> = vec![Vec::new(); theory.sentences().len()];
        for constraint in constraints {
            let span = match constraint {
                Constraint::ExactParseSpan(span) => span,
                Constraint::ExactSentence(_)
                | Constraint::ExactName(_)
                | Constraint::ExactMention(_)
                | Constraint::ExactEntity(_)
                | Constraint::ExactRelation(_)
                | Constraint::ExactEvent(_) => return Err(unsupported(Self::NAME, constraint)),
            };
            let index = sentence_index(theory, span.range).ok_or_else(|| {
                AnnotationError::MalformedConstraint {
                    constraint: constraint.to_string(),
                    reason: "range is not inside a single sentence".to_string(),
                }
            })?;
            per_sentence[index].push(span.clone());
        }

        let mut edits = SentenceEdits::new();
        for (index, spans) in per_sentence.iter().enumerate() {
            let sentence = edits.sentence(theory, index);
            let parse = self.builder.build(sentence.current().tokens(), spans)?;
            debug!(document = %theory.id(), sentence = index, tree = %parse, "parsed");
            sentence.set_parse(parse);
        }

        let mut builder = theory.to_builder();
        edits.apply(&mut builder);
        Ok(builder.build())
    }
}
