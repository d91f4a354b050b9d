use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{AnnotationError, OffsetRange, SynNode, TokenSequence, TokenSpan};

/// A constituency parse of one sentence: a root node plus a confidence score.
///
/// The root always covers every token of the sentence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParse")]
pub struct Parse {
    tokens: TokenSequence,
    root: Arc<SynNode>,
    score: f32,
}

#[derive(Deserialize)]
#[serde(rename = "Parse")]
struct RawParse {
    tokens: TokenSequence,
    root: Arc<SynNode>,
    score: f32,
}

impl TryFrom<RawParse> for Parse {
    type Error = AnnotationError;

    fn try_from(raw: RawParse) -> Result<Self, Self::Error> {
        Parse::new(raw.tokens, raw.root, raw.score)
    }
}

impl Parse {
    pub fn new(tokens: TokenSequence, root: Arc<SynNode>, score: f32) -> Result<Self, AnnotationError> {
        let expected = TokenSpan::new(0, tokens.len() - 1);
        if root.span() != expected {
            return Err(AnnotationError::StructuralInvariant(format!(
                "parse root covers {} but the sentence has tokens {}",
                root.span(),
                expected
            )));
        }
        Ok(Self {
            tokens,
            root,
            score,
        })
    }

    pub fn root(&self) -> &Arc<SynNode> {
        &self.root
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Character boundaries of a node: start of its first token, end of its last.
    pub fn char_range(&self, node: &SynNode) -> OffsetRange {
        self.tokens.char_range_of(node.span())
    }
}

impl fmt::Display for Parse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.root, f)
    }
}
