use layered_theory::syntax::project_onto_tokens;
use layered_theory::{
    AnnotationError, Constraint, ConstraintKind, DocumentTheory, EventArgument, MentionId,
};
use tracing::debug;

use super::unsupported;
use crate::Stage;

/// Adds an event for every `ExactEvent` constraint whose anchor falls on token
/// boundaries inside one sentence and whose arguments all resolve to mentions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedEventFinder;

impl ConstrainedEventFinder {
    pub const NAME: &'static str = "events";
}

impl Stage for ConstrainedEventFinder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactEvent]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut builder = theory.to_builder();

        for constraint in constraints {
            let wanted = match constraint {
                Constraint::ExactEvent(wanted) => wanted,
                Constraint::ExactSentence(_)
                | Constraint::ExactName(_)
                | Constraint::ExactMention(_)
                | Constraint::ExactParseSpan(_)
                | Constraint::ExactEntity(_)
                | Constraint::ExactRelation(_) => return Err(unsupported(Self::NAME, constraint)),
            };
            let anchored = theory
                .sentence_containing(wanted.anchor)
                .map_or(false, |sentence| {
                    project_onto_tokens(sentence.tokens(), wanted.anchor).is_ok()
                });
            if !anchored {
                debug!(%constraint, "event anchor does not fall on token boundaries");
                continue;
            }

            let arguments: Option<Vec<EventArgument>> = wanted
                .arguments
                .iter()
                .map(|spec| {
                    let mention: MentionId = theory.mentions_at(spec.range).next()?.id;
                    Some(EventArgument {
                        role: spec.role.clone(),
                        mention,
                    })
                })
                .collect();
            let Some(arguments) = arguments else {
                debug!(%constraint, "event argument has no mention");
                continue;
            };
            if constraint.satisfied_by(builder.current()) {
                continue;
            }
            builder.add_event(
                &wanted.event_type,
                wanted.anchor,
                arguments,
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
        ArgumentSpec, DocumentId, EntityType, EventConstraint, MentionType, Modality, OffsetRange,
        SentenceTheory, Tense, TokenSequence, TokenSpan,
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

    fn hiring(anchor: (usize, usize), person: (usize, usize)) -> Constraint {
        Constraint::ExactEvent(EventConstraint {
            event_type: "Personnel.Start-Position".into(),
            anchor: OffsetRange::new(anchor.0, anchor.1),
            arguments: vec![
                ArgumentSpec {
                    role: "Entity".into(),
                    range: OffsetRange::new(0, 3),
                },
                ArgumentSpec {
                    role: "Person".into(),
                    range: OffsetRange::new(person.0, person.1),
                },
            ],
            modality: Modality::Asserted,
            tense: Tense::Past,
            external_id: Some("ev-1".into()),
        })
    }

    #[test]
    fn event_with_resolved_arguments() {
        let wanted = hiring((5, 9), (11, 13));
        let theory = ConstrainedEventFinder
            .process_constrained(&with_mentions(), std::slice::from_ref(&wanted))
            .unwrap();

        assert_eq!(theory.events().len(), 1);
        assert_eq!(theory.events()[0].arguments.len(), 2);
        assert!(wanted.satisfied_by(&theory));
    }

    #[test]
    fn bad_anchor_or_argument_is_skipped() {
        let mid_token = hiring((6, 9), (11, 13));
        let no_mention = hiring((5, 9), (5, 9));
        let theory = ConstrainedEventFinder
            .process_constrained(&with_mentions(), &[mid_token.clone(), no_mention.clone()])
            .unwrap();

        assert!(theory.events().is_empty());
        assert!(!mid_token.satisfied_by(&theory));
        assert!(!no_mention.satisfied_by(&theory));
    }
}
