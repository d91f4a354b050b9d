use layered_theory::{
    AnnotationError, Constraint, ConstraintKind, DocumentTheory, SentenceConstraint,
    SentenceTheory, TokenSequence, TokenSpan,
};
use tracing::debug;

use super::unsupported;
use crate::Stage;

const TERMINATORS: &[&str] = &[".", "!", "?"];
const CLOSERS: &[&str] = &["\"", "'", ")", "]", "\u{201d}", "\u{2019}"];

/// Splits the document text into sentences.
///
/// A sentence ends after a run of terminators and closing punctuation that
/// contains at least one terminator. `ExactSentence` constraints override the
/// rule: each forced range becomes one sentence, and the text around it is
/// segmented as usual.
///
/// Re-segmenting discards every annotation of the previous theory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSegmenter;

impl SentenceSegmenter {
    pub const NAME: &'static str = "sentences";

    pub fn new() -> Self {
        Self
    }
}

impl Stage for SentenceSegmenter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self) -> &[ConstraintKind] {
        &[ConstraintKind::ExactSentence]
    }

    fn process_constrained(
        &self,
        theory: &DocumentTheory,
        constraints: &[Constraint],
    ) -> Result<DocumentTheory, AnnotationError> {
        let mut builder = theory.to_builder();
        let tokens = match TokenSequence::from_text(theory.text(), 0) {
            Some(tokens) => tokens,
            None => {
                for constraint in constraints {
                    sentence_constraint(constraint)?;
                }
                builder.set_sentences(Vec::new());
                return Ok(builder.build());
            }
        };

        let forced = forced_spans(&tokens, constraints)?;
        let mut sentences = Vec::new();
        for (index, span) in segment(&tokens, &forced).into_iter().enumerate() {
            let sentence_tokens = tokens.tokens()[span.start..=span.end].to_vec();
            sentences.push(SentenceTheory::new(index, TokenSequence::new(sentence_tokens)?));
        }
        debug!(document = %theory.id(), sentences = sentences.len(), "segmented");

        builder.set_sentences(sentences);
        Ok(builder.build())
    }
}

fn sentence_constraint(constraint: &Constraint) -> Result<&SentenceConstraint, AnnotationError> {
    match constraint {
        Constraint::ExactSentence(sentence) => Ok(sentence),
        Constraint::ExactName(_)
        | Constraint::ExactMention(_)
        | Constraint::ExactParseSpan(_)
        | Constraint::ExactEntity(_)
        | Constraint::ExactRelation(_)
        | Constraint::ExactEvent(_) => Err(unsupported(SentenceSegmenter::NAME, constraint)),
    }
}

/// Token spans of the `ExactSentence` constraints that fall on token boundaries,
/// in order. Two forced sentences may not overlap.
fn forced_spans(
    tokens: &TokenSequence,
    constraints: &[Constraint],
) -> Result<Vec<TokenSpan>, AnnotationError> {
    let mut forced = Vec::new();
    for constraint in constraints {
        let sentence = sentence_constraint(constraint)?;
        match tokens.span_for(sentence.range) {
            Some(span) => forced.push((span, constraint)),
            None => debug!(%constraint, "sentence range does not fall on token boundaries"),
        }
    }
    forced.sort_by_key(|(span, _)| *span);
    forced.dedup_by_key(|(span, _)| *span);

    for pair in forced.windows(2) {
        let ((left, left_constraint), (right, right_constraint)) = (&pair[0], &pair[1]);
        if left.end >= right.start {
            return Err(AnnotationError::MalformedConstraint {
                constraint: right_constraint.to_string(),
                reason: format!("overlaps {}", left_constraint),
            });
        }
    }
    Ok(forced.into_iter().map(|(span, _)| span).collect())
}

fn segment(tokens: &TokenSequence, forced: &[TokenSpan]) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut forced = forced.iter().copied().peekable();
    let mut start = 0;
    let mut idx = 0;

    while idx < tokens.len() {
        if let Some(span) = forced.next_if(|span| span.start == idx) {
            spans.push(span);
            idx = span.end + 1;
            start = idx;
            continue;
        }
        let before_forced = forced.peek().map_or(false, |span| span.start == idx + 1);
        if before_forced || ends_sentence(tokens, start, idx) {
            spans.push(TokenSpan::new(start, idx));
            start = idx + 1;
        }
        idx += 1;
    }
    if start < tokens.len() {
        spans.push(TokenSpan::new(start, tokens.len() - 1));
    }
    spans
}

fn is_trailing(text: &str) -> bool {
    TERMINATORS.contains(&text) || CLOSERS.contains(&text)
}

fn ends_sentence(tokens: &TokenSequence, start: usize, idx: usize) -> bool {
    let text = |i: usize| tokens.tokens()[i].text.as_str();
    if !is_trailing(text(idx)) {
        return false;
    }
    if idx + 1 < tokens.len() && is_trailing(text(idx + 1)) {
        return false;
    }
    (start..=idx)
        .rev()
        .map(text)
        .take_while(|t| is_trailing(t))
        .any(|t| TERMINATORS.contains(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_theory::{DocumentId, OffsetRange, SentenceConstraint};

    fn run(text: &str, forced: &[(usize, usize)]) -> Result<DocumentTheory, AnnotationError> {
        let constraints: Vec<_> = forced
            .iter()
            .map(|&(start, end)| {
                Constraint::ExactSentence(SentenceConstraint {
                    range: OffsetRange::new(start, end),
                    external_id: None,
                })
            })
            .collect();
        SentenceSegmenter::new()
            .process_constrained(&DocumentTheory::new(DocumentId::from("d"), text), &constraints)
    }

    fn ranges(theory: &DocumentTheory) -> Vec<String> {
        theory
            .sentences()
            .iter()
            .map(|sentence| sentence.char_range().to_string())
            .collect()
    }

    #[test]
    fn splits_on_terminators() {
        let theory = run("Acme hired Bob. He left!", &[]).unwrap();
        assert_eq!(ranges(&theory), vec!["[0-14]", "[16-23]"]);
        assert_eq!(theory.sentences()[1].index(), 1);
        assert_eq!(theory.sentences()[1].tokens().tokens()[0].text, "He");
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        let theory = run("She said \"Go.\" Then left...", &[]).unwrap();
        assert_eq!(ranges(&theory), vec!["[0-13]", "[15-26]"]);
    }

    #[test]
    fn trailing_text_without_terminator_is_a_sentence() {
        let theory = run("One. two three", &[]).unwrap();
        assert_eq!(ranges(&theory), vec!["[0-3]", "[5-13]"]);
    }

    #[test]
    fn forced_sentences_override_the_rule() {
        let theory = run("Acme hired Bob. He left.", &[(5, 14)]).unwrap();
        assert_eq!(ranges(&theory), vec!["[0-3]", "[5-14]", "[16-23]"]);

        let whole = run("Acme hired Bob. He left.", &[(0, 23)]).unwrap();
        assert_eq!(ranges(&whole), vec!["[0-23]"]);
    }

    #[test]
    fn misaligned_range_is_left_unrealised() {
        let constraint = Constraint::ExactSentence(SentenceConstraint {
            range: OffsetRange::new(1, 14),
            external_id: None,
        });
        let theory = SentenceSegmenter::new()
            .process_constrained(
                &DocumentTheory::new(DocumentId::from("d"), "Acme hired Bob. He left."),
                std::slice::from_ref(&constraint),
            )
            .unwrap();
        assert_eq!(ranges(&theory), vec!["[0-14]", "[16-23]"]);
        assert!(!constraint.satisfied_by(&theory));
    }

    #[test]
    fn overlapping_forced_sentences_are_malformed() {
        let err = run("Acme hired Bob. He left.", &[(0, 14), (11, 23)]).unwrap_err();
        assert!(matches!(err, AnnotationError::MalformedConstraint { .. }));
    }

    #[test]
    fn empty_text_has_no_sentences() {
        let theory = run("   ", &[]).unwrap();
        assert!(theory.sentences().is_empty());
    }
}
