//! Locates the node or token span whose boundaries match a character range exactly.
//!
//! A match is exact-boundary only: the start offset of the node's first token
//! must equal the target start and the end offset of its last token must equal
//! the target end. A node that merely contains the target does not count.
//! Nothing here mutates; callers attach annotations through a builder.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::{AnnotationError, OffsetRange, Parse, SentenceTheory, SynNode, TokenSequence, TokenSpan};

/// Breadth-first search for the shallowest node whose boundaries equal `target`.
///
/// Only nodes containing `target` are expanded, since no node outside them can
/// match.
pub fn project_onto_parse(parse: &Parse, target: OffsetRange) -> Result<&Arc<SynNode>, AnnotationError> {
    let mut queue: VecDeque<&Arc<SynNode>> = VecDeque::new();
    queue.push_back(parse.root());

    while let Some(node) = queue.pop_front() {
        let range = parse.char_range(node);
        if range == target {
            return Ok(node);
        }
        if range.contains(&target) {
            queue.extend(node.children());
        }
    }

    Err(AnnotationError::NotFound(format!(
        "no parse node with exact boundaries {}",
        target
    )))
}

/// The token span whose first token starts at `target.start` and last token ends at `target.end`.
pub fn project_onto_tokens(tokens: &TokenSequence, target: OffsetRange) -> Result<TokenSpan, AnnotationError> {
    tokens.span_for(target).ok_or_else(|| {
        AnnotationError::NotFound(format!(
            "no token span with exact boundaries {}",
            target
        ))
    })
}

/// Project onto the sentence's parse when it has one, otherwise onto its tokens.
pub fn project_onto_sentence(sentence: &SentenceTheory, target: OffsetRange) -> Result<TokenSpan, AnnotationError> {
    match sentence.parse() {
        Some(parse) => project_onto_parse(parse, target).map(|node| node.span()),
        None => project_onto_tokens(sentence.tokens(), target),
    }
}
