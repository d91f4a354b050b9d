use layered_theory::syntax::project_onto_sentence;
use layered_theory::{AnnotationError, Constraint, ConstraintKind, DocumentTheory, MentionType};
use tracing::debug;

use super::{sentence_index, unsupported, SentenceEdits};
use crate::Stage;

/// Finds mentions by projecting ranges onto each sentence's parse (or its
/// tokens when the sentence has not been parsed).
///
/// Every name whose range projects becomes a `NAME` mention. Each
/// `ExactMention` constraint then adds a mention at its projected span, unless
/// that span already carries a mention. An existing mention with other
/// attributes is a conflict and the constraint stays unsatisfied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedMentionFinder;

impl ConstrainedMentionFinder {
    pub const NAME: &'static str = "mentions";
}

impl Stage for ConstrainedMentionFinder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactMention]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut edits = SentenceEdits::new();

        for (index, published) in theory.sentences().iter().enumerate() {
            for name in published.names() {
                let tokens = match project_onto_sentence(published, name.range) {
                    Ok(tokens) => tokens,
                    Err(err) => {
                        debug!(name = %name.range, error = %err, "name has no matching node");
                        continue;
                    }
                };
                let sentence = edits.sentence(theory, index);
                if sentence.current().mention_at(tokens).is_none() {
                    sentence.add_mention(
                        tokens,
                        name.entity_type,
                        MentionType::Name,
                        name.external_id.clone(),
                    );
                }
            }
        }

        for constraint in constraints {
            let wanted = match constraint {
                Constraint::ExactMention(wanted) => wanted,
                Constraint::ExactSentence(_)
                | Constraint::ExactName(_)
                | Constraint::ExactParseSpan(_)
                | Constraint::ExactEntity(_)
                | Constraint::ExactRelation(_)
                | Constraint::ExactEvent(_) => return Err(unsupported(Self::NAME, constraint)),
            };
            let Some(index) = sentence_index(theory, wanted.range) else {
                debug!(%constraint, "mention lies outside every sentence");
                continue;
            };
            let sentence = edits.sentence(theory, index);
            let tokens = match project_onto_sentence(sentence.current(), wanted.range) {
                Ok(tokens) => tokens,
                Err(err) => {
                    debug!(%constraint, error = %err, "mention not placed");
                    continue;
                }
            };
            match sentence.current().mention_at(tokens) {
                Some(existing)
                    if existing.entity_type == wanted.entity_type
                        && existing.mention_type == wanted.mention_type => {}
                Some(existing) => {
                    debug!(%constraint, existing = %existing.id, "conflicting mention already present");
                }
                None => {
                    sentence.add_mention(
                        tokens,
                        wanted.entity_type,
                        wanted.mention_type,
                        wanted.external_id.clone(),
                    );
                }
            }
        }

        let mut builder = theory.to_builder();
        edits.apply(&mut builder);
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{ConstrainedNameFinder, ConstrainedParser, SentenceSegmenter};
    use layered_theory::{
        DocumentId, EntityType, MentionConstraint, NameConstraint, OffsetRange, ParseSpanConstraint,
    };

    // The(0-2) old(4-6) man(8-10) met(12-14) Kim(16-18) .(19)
    const TEXT: &str = "The old man met Kim.";

    fn prepared(parse_spans: &[(usize, usize)]) -> DocumentTheory {
        let theory = SentenceSegmenter::new()
            .process(&DocumentTheory::new(DocumentId::from("d"), TEXT))
            .unwrap();
        let theory = ConstrainedNameFinder
            .process_constrained(
                &theory,
                &[Constraint::ExactName(NameConstraint {
                    range: OffsetRange::new(16, 18),
                    entity_type: EntityType::Person,
                    external_id: Some("kim".into()),
                })],
            )
            .unwrap();
        let spans: Vec<_> = parse_spans
            .iter()
            .map(|&(s, e)| Constraint::ExactParseSpan(ParseSpanConstraint::new(s, e)))
            .collect();
        ConstrainedParser::new().process_constrained(&theory, &spans).unwrap()
    }

    fn mention(start: usize, end: usize, mention_type: MentionType) -> Constraint {
        Constraint::ExactMention(MentionConstraint {
            range: OffsetRange::new(start, end),
            entity_type: EntityType::Person,
            mention_type,
            external_id: None,
        })
    }

    #[test]
    fn names_become_name_mentions() {
        let theory = ConstrainedMentionFinder.process(&prepared(&[])).unwrap();

        let mentions: Vec<_> = theory.mentions().collect();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].mention_type, MentionType::Name);
        assert_eq!(mentions[0].range, OffsetRange::new(16, 18));
        assert_eq!(mentions[0].external_id.as_deref(), Some("kim"));
    }

    #[test]
    fn constrained_mentions_need_a_matching_node() {
        let with_np = prepared(&[(0, 10)]);
        let flat = prepared(&[]);
        let the_old_man = mention(0, 10, MentionType::Desc);

        let theory = ConstrainedMentionFinder
            .process_constrained(&with_np, std::slice::from_ref(&the_old_man))
            .unwrap();
        assert!(the_old_man.satisfied_by(&theory));

        // The flat tree has no node covering exactly "The old man".
        let theory = ConstrainedMentionFinder
            .process_constrained(&flat, std::slice::from_ref(&the_old_man))
            .unwrap();
        assert!(!the_old_man.satisfied_by(&theory));
    }

    #[test]
    fn conflicting_attributes_leave_the_constraint_unsatisfied() {
        let pronoun_kim = mention(16, 18, MentionType::Pron);
        let name_kim = mention(16, 18, MentionType::Name);
        let theory = ConstrainedMentionFinder
            .process_constrained(&prepared(&[]), &[pronoun_kim.clone(), name_kim.clone()])
            .unwrap();

        assert_eq!(theory.mentions().count(), 1);
        assert!(!pronoun_kim.satisfied_by(&theory));
        assert!(name_kim.satisfied_by(&theory));
    }
}
