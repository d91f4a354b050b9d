use std::collections::BTreeSet;

use layered_theory::{AnnotationError, Constraint, ConstraintKind, DocumentTheory, MentionId};
use tracing::debug;

use super::unsupported;
use crate::Stage;

/// Groups mentions into entities.
///
/// Each `ExactEntity` constraint whose mention ranges all resolve to mentions
/// not yet claimed by another entity becomes one entity. Every mention left
/// over becomes a singleton entity of its own type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedEntityFinder;

impl ConstrainedEntityFinder {
    pub const NAME: &'static str = "entities";
}

impl Stage for ConstrainedEntityFinder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactEntity]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut builder = theory.to_builder();
        let mut claimed: BTreeSet<MentionId> = theory
            .entities()
            .iter()
            .flat_map(|entity| entity.mentions.iter().copied())
            .collect();

        for constraint in constraints {
            let wanted = match constraint {
                Constraint::ExactEntity(wanted) => wanted,
                Constraint::ExactSentence(_)
                | Constraint::ExactName(_)
                | Constraint::ExactMention(_)
                | Constraint::ExactParseSpan(_)
                | Constraint::ExactRelation(_)
                | Constraint::ExactEvent(_) => return Err(unsupported(Self::NAME, constraint)),
            };
            let resolved: Option<Vec<MentionId>> = wanted
                .mention_ranges
                .iter()
                .map(|range| theory.mentions_at(*range).next().map(|mention| mention.id))
                .collect();
            let mentions = match resolved {
                Some(mentions) if !mentions.is_empty() => mentions,
                _ => {
                    debug!(%constraint, "entity references a range without a mention");
                    continue;
                }
            };
            if mentions.iter().any(|id| claimed.contains(id)) {
                debug!(%constraint, "mention already belongs to another entity");
                continue;
            }
            claimed.extend(mentions.iter().copied());
            builder.add_entity(wanted.entity_type, mentions, wanted.external_id.clone());
        }

        for mention in theory.mentions() {
            if claimed.insert(mention.id) {
                builder.add_entity(mention.entity_type, vec![mention.id], None);
            }
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_theory::{
        DocumentId, EntityConstraint, EntityType, MentionType, OffsetRange, SentenceTheory,
        TokenSequence, TokenSpan,
    };

    // Kim(0-2) smiled(4-9) .(10) She(12-14) left(16-19) .(20)
    fn with_mentions() -> DocumentTheory {
        let mut first =
            SentenceTheory::new(0, TokenSequence::from_text("Kim smiled.", 0).unwrap()).to_builder();
        first.add_mention(TokenSpan::single(0), EntityType::Person, MentionType::Name, None);
        let mut second =
            SentenceTheory::new(1, TokenSequence::from_text("She left.", 12).unwrap()).to_builder();
        second.add_mention(TokenSpan::single(0), EntityType::Person, MentionType::Pron, None);

        let mut builder =
            DocumentTheory::new(DocumentId::from("d"), "Kim smiled. She left.").to_builder();
        builder.set_sentences(vec![first.build(), second.build()]);
        builder.build()
    }

    fn entity(ranges: &[(usize, usize)]) -> Constraint {
        Constraint::ExactEntity(EntityConstraint {
            mention_ranges: ranges.iter().map(|&(s, e)| OffsetRange::new(s, e)).collect(),
            entity_type: EntityType::Person,
            external_id: Some("person-1".into()),
        })
    }

    #[test]
    fn constrained_mentions_corefer() {
        let kim_and_she = entity(&[(0, 2), (12, 14)]);
        let theory = ConstrainedEntityFinder
            .process_constrained(&with_mentions(), std::slice::from_ref(&kim_and_she))
            .unwrap();

        assert_eq!(theory.entities().len(), 1);
        assert_eq!(theory.entities()[0].external_id.as_deref(), Some("person-1"));
        assert!(kim_and_she.satisfied_by(&theory));
    }

    #[test]
    fn leftover_mentions_become_singletons() {
        let theory = ConstrainedEntityFinder.process(&with_mentions()).unwrap();
        assert_eq!(theory.entities().len(), 2);
        assert!(theory.entities().iter().all(|entity| entity.mentions.len() == 1));
    }

    #[test]
    fn unresolvable_or_overlapping_groups_are_skipped() {
        let missing = entity(&[(0, 2), (16, 19)]);
        let first = entity(&[(0, 2)]);
        let overlapping = entity(&[(0, 2), (12, 14)]);
        let theory = ConstrainedEntityFinder
            .process_constrained(
                &with_mentions(),
                &[missing.clone(), first.clone(), overlapping.clone()],
            )
            .unwrap();

        assert!(!missing.satisfied_by(&theory));
        assert!(first.satisfied_by(&theory));
        assert!(!overlapping.satisfied_by(&theory));
        assert_eq!(theory.entities().len(), 2);
    }
}
