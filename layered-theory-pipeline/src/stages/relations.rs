use layered_theory::{AnnotationError, Constraint, ConstraintKind, DocumentTheory, OffsetRange};
use tracing::debug;

use super::unsupported;
use crate::Stage;

/// Adds a relation for every `ExactRelation` constraint whose two arguments
/// resolve to existing mentions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedRelationFinder;

impl ConstrainedRelationFinder {
    pub const NAME: &'static str = "relations";
}

impl Stage for ConstrainedRelationFinder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactRelation]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut builder = theory.to_builder();
        let mention_at = |range: OffsetRange| theory.mentions_at(range).next().map(|m| m.id);

        for constraint in constraints {
            let wanted = match constraint {
                Constraint::ExactRelation(wanted) => wanted,
                Constraint::ExactSentence(_)
                | Constraint::ExactName(_)
                | Constraint::ExactMention(_)
                | Constraint::ExactParseSpan(_)
                | Constraint::ExactEntity(_)
                | Constraint::ExactEvent(_) => return Err(unsupported(Self::NAME, constraint)),
            };
            let (Some(left), Some(right)) = (mention_at(wanted.left), mention_at(wanted.right)) else {
                debug!(%constraint, "relation argument has no mention");
                continue;
            };
            // Satisfied already, by an earlier run or a duplicate constraint.
            if constraint.satisfied_by(builder.current()) {
                continue;
            }
            builder.add_relation(
                &wanted.relation_type,
                left,
                right,
                wanted.modality,
                wanted.tense,
                wanted.external_id.clone(),
            );
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_theory::{
        DocumentId, EntityType, MentionType, Modality, RelationConstraint, SentenceTheory, Tense,
        TokenSequence, TokenSpan,
    };

    // Acme(0-3) hired(5-9) Bob(11-13) .(14)
    fn with_mentions() -> DocumentTheory {
        let mut sentence =
            SentenceTheory::new(0, TokenSequence::from_text("Acme hired Bob.", 0).unwrap()).to_builder();
        sentence.add_mention(TokenSpan::single(0), EntityType::Organization, MentionType::Name, None);
        sentence.add_mention(TokenSpan::single(2), EntityType::Person, MentionType::Name, None);
        let mut builder = DocumentTheory::new(DocumentId::from("d"), "Acme hired Bob.").to_builder();
        builder.set_sentences(vec![sentence.build()]);
        builder.build()
    }

    fn employs(left: (usize, usize), right: (usize, usize)) -> Constraint {
        Constraint::ExactRelation(RelationConstraint {
            relation_type: "ORG-AFF.Employment".into(),
            left: OffsetRange::new(left.0, left.1),
            right: OffsetRange::new(right.0, right.1),
            modality: Modality::Asserted,
            tense: Tense::Past,
            external_id: None,
        })
    }

    #[test]
    fn relation_between_existing_mentions() {
        let wanted = employs((11, 13), (0, 3));
        let theory = ConstrainedRelationFinder
            .process_constrained(&with_mentions(), &[wanted.clone(), wanted.clone()])
            .unwrap();

        assert_eq!(theory.relations().len(), 1);
        assert_eq!(theory.relations()[0].tense, Tense::Past);
        assert!(wanted.satisfied_by(&theory));
    }

    #[test]
    fn missing_argument_is_skipped() {
        let wanted = employs((5, 9), (0, 3));
        let theory = ConstrainedRelationFinder
            .process_constrained(&with_mentions(), std::slice::from_ref(&wanted))
            .unwrap();
        assert!(theory.relations().is_empty());
        assert!(!wanted.satisfied_by(&theory));
    }
}
