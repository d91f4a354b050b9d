//! Builds the smallest constituency tree consistent with a set of bracketing spans.
//!
//! The frontier starts as one leaf per token, keyed by the token's character
//! range. Spans are applied shortest first (ties by left offset), so by the time
//! a span is applied every bracket nested inside it already sits in the frontier
//! as a single subtree. Applying a span replaces the frontier entries it encloses
//! with one new nonterminal. Whatever is left at the end becomes the children of
//! the root.

use std::sync::Arc;

use crate::syntax::RangeMap;
use crate::{AnnotationError, OffsetRange, Parse, ParseSpanConstraint, SynNode, TokenSequence, TokenSpan};

#[derive(Debug, Clone)]
pub struct MinimalTreeBuilder {
    root_label: String,
    default_label: String,
    score: f32,
}

impl Default for MinimalTreeBuilder {
    fn default() -> Self {
        Self {
            root_label: "S".to_string(),
            default_label: "X".to_string(),
            score: 1.0,
        }
    }
}

impl MinimalTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the labels used for the synthetic root and for unlabeled spans.
    pub fn with_labels(mut self, root_label: &str, default_label: &str) -> Self {
        self.root_label = root_label.to_string();
        self.default_label = default_label.to_string();
        self
    }

    /// Build a parse whose root covers `tokens` and which has a node exactly
    /// covering every span in `spans`.
    ///
    /// Fails with `StructuralInvariant` when two spans (or a span and a token)
    /// cross. Fails with `MalformedConstraint` when a span is inverted, leaves
    /// the sentence, or does not begin and end exactly on token boundaries
    /// (whitespace padding included).
    pub fn build(
        &self,
        tokens: &TokenSequence,
        spans: &[ParseSpanConstraint],
    ) -> Result<Parse, AnnotationError> {
        let sentence = tokens.char_range();
        let mut frontier: RangeMap<Arc<SynNode>> = tokens
            .tokens()
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.range, SynNode::terminal(token.text.clone(), idx)))
            .collect();

        for span in spans {
            OffsetRange::try_new(span.range.start, span.range.end)?;
        }
        let mut ordered: Vec<&ParseSpanConstraint> = spans.iter().collect();
        ordered.sort_by_key(|span| (span.range.len(), span.range.start));

        for span in ordered {
            if !sentence.contains(&span.range) {
                return Err(AnnotationError::MalformedConstraint {
                    constraint: span.to_string(),
                    reason: format!("range lies outside sentence {}", sentence),
                });
            }
            if let Some((crossed, _)) = frontier.crossing(span.range).next() {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "span {} crosses {}; crossing brackets cannot form a tree",
                    span.range, crossed
                )));
            }
            if tokens.span_for(span.range).is_none() {
                return Err(AnnotationError::MalformedConstraint {
                    constraint: span.to_string(),
                    reason: "range does not start and end on token boundaries".to_string(),
                });
            }

            let enclosed: Vec<OffsetRange> = frontier
                .enclosed_by(span.range)
                .map(|(range, _)| *range)
                .collect();
            // A single token, or a bracket already built for an identical span.
            if enclosed.len() < 2 {
                continue;
            }

            let key = OffsetRange::new(enclosed[0].start, enclosed[enclosed.len() - 1].end);
            let children = enclosed
                .iter()
                .filter_map(|range| frontier.remove(range))
                .collect();
            let label = span.label.as_deref().unwrap_or(&self.default_label);
            frontier.insert(key, SynNode::nonterminal(label, children, 0)?);
        }

        let mut remaining: Vec<Arc<SynNode>> = frontier.into_values().collect();
        let root = if remaining.len() == 1 && !remaining[0].is_terminal() {
            // A span covering the whole sentence is already the root.
            remaining.remove(0)
        } else {
            SynNode::nonterminal(self.root_label.as_str(), remaining, 0)?
        };

        let expected = TokenSpan::new(0, tokens.len() - 1);
        if root.span() != expected {
            return Err(AnnotationError::StructuralInvariant(format!(
                "minimal tree covers {} instead of sentence tokens {}",
                root.span(),
                expected
            )));
        }

        Parse::new(tokens.clone(), root, self.score)
    }
}
