use layered_theory::syntax::project_onto_tokens;
use layered_theory::{AnnotationError, Constraint, ConstraintKind, DocumentTheory};
use tracing::debug;

use super::{sentence_index, unsupported, SentenceEdits};
use crate::Stage;

/// Adds a name for every `ExactName` constraint whose range falls on token
/// boundaries inside one sentence.
///
/// A name already present at the same range with a different entity type is a
/// conflict; the constraint is left for the gate to report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedNameFinder;

impl ConstrainedNameFinder {
    pub const NAME: &'static str = "names";
}

impl Stage for ConstrainedNameFinder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactName]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut edits = SentenceEdits::new();

        for constraint in constraints {
            let name = match constraint {
                Constraint::ExactName(name) => name,
                Constraint::ExactSentence(_)
                | Constraint::ExactMention(_)
                | Constraint::ExactParseSpan(_)
                | Constraint::ExactEntity(_)
                | Constraint::ExactRelation(_)
                | Constraint::ExactEvent(_) => return Err(unsupported(Self::NAME, constraint)),
            };
            let Some(index) = sentence_index(theory, name.range) else {
                debug!(%constraint, "name lies outside every sentence");
                continue;
            };
            let sentence = edits.sentence(theory, index);
            let tokens = match project_onto_tokens(sentence.current().tokens(), name.range) {
                Ok(tokens) => tokens,
                Err(err) => {
                    debug!(%constraint, error = %err, "name not placed");
                    continue;
                }
            };
            match sentence.current().name_at(name.range) {
                Some(existing) if existing.entity_type == name.entity_type => {}
                Some(existing) => {
                    debug!(%constraint, existing = %existing.entity_type, "conflicting name already present");
                }
                None => sentence.add_name(tokens, name.entity_type, name.external_id.clone()),
            }
        }

        let mut builder = theory.to_builder();
        edits.apply(&mut builder);
        Ok(builder.build())
    }
}
