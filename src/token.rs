//! Tokens and per-sentence token sequences.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{AnnotationError, OffsetRange, TokenSpan};

/// A token owning its character-offset range in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub range: OffsetRange,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            range: OffsetRange::new(start, end),
        }
    }
}

/// The ordered, immutable tokens of one sentence.
///
/// Token ranges are strictly increasing and never overlap. Whitespace between
/// tokens is not covered by any token. Cloning shares the underlying storage.
/// Deserializing goes through [`TokenSequence::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTokenSequence")]
pub struct TokenSequence {
    tokens: Arc<[Token]>,
}

#[derive(Deserialize)]
#[serde(rename = "TokenSequence")]
struct RawTokenSequence {
    tokens: Vec<Token>,
}

impl TryFrom<RawTokenSequence> for TokenSequence {
    type Error = AnnotationError;

    fn try_from(raw: RawTokenSequence) -> Result<Self, Self::Error> {
        Self::new(raw.tokens)
    }
}

impl TokenSequence {
    /// Build a sequence, checking that it is non-empty and ordered without overlaps.
    pub fn new(tokens: Vec<Token>) -> Result<Self, AnnotationError> {
        if tokens.is_empty() {
            return Err(AnnotationError::StructuralInvariant(
                "a token sequence needs at least one token".to_string(),
            ));
        }
        for pair in tokens.windows(2) {
            if pair[0].range.end >= pair[1].range.start {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "token {:?} {} overlaps or precedes token {:?} {}",
                    pair[1].text, pair[1].range, pair[0].text, pair[0].range
                )));
            }
        }
        Ok(Self {
            tokens: tokens.into(),
        })
    }

    /// Tokenize `text` on Unicode word boundaries, dropping whitespace.
    ///
    /// Offsets are character offsets, shifted by `base_offset` so that a
    /// sentence cut out of a larger document keeps document coordinates.
    /// Returns `None` when `text` holds no tokens.
    pub fn from_text(text: &str, base_offset: usize) -> Option<Self> {
        let tokens = tokenize(text, base_offset);
        if tokens.is_empty() {
            None
        } else {
            Some(Self {
                tokens: tokens.into(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Character range from the first token's start to the last token's end.
    pub fn char_range(&self) -> OffsetRange {
        let first = &self.tokens[0];
        let last = &self.tokens[self.tokens.len() - 1];
        OffsetRange::new(first.range.start, last.range.end)
    }

    /// Character range of a token span: start of its first token, end of its last.
    pub fn char_range_of(&self, span: TokenSpan) -> OffsetRange {
        OffsetRange::new(
            self.tokens[span.start].range.start,
            self.tokens[span.end].range.end,
        )
    }

    /// Index of the token whose range starts exactly at `offset`.
    pub fn token_starting_at(&self, offset: usize) -> Option<usize> {
        self.tokens
            .binary_search_by(|token| token.range.start.cmp(&offset))
            .ok()
    }

    /// Index of the token whose range ends exactly at `offset`.
    pub fn token_ending_at(&self, offset: usize) -> Option<usize> {
        self.tokens
            .binary_search_by(|token| token.range.end.cmp(&offset))
            .ok()
    }

    /// The token span whose boundary offsets equal `range` exactly.
    pub fn span_for(&self, range: OffsetRange) -> Option<TokenSpan> {
        let start = self.token_starting_at(range.start)?;
        let end = self.token_ending_at(range.end)?;
        if start <= end {
            Some(TokenSpan::new(start, end))
        } else {
            None
        }
    }

    /// Token texts of a span joined by single spaces.
    pub fn words(&self, span: TokenSpan) -> String {
        self.tokens[span.start..=span.end]
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn tokenize(text: &str, base_offset: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut char_pos = base_offset;
    for segment in text.split_word_bounds() {
        let char_len = segment.chars().count();
        if !segment.trim().is_empty() {
            tokens.push(Token::new(segment, char_pos, char_pos + char_len - 1));
        }
        char_pos += char_len;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_with_inclusive_char_offsets() {
        let seq = TokenSequence::from_text("The boy ran.", 0).unwrap();
        let ranges: Vec<_> = seq
            .tokens()
            .iter()
            .map(|t| (t.text.as_str(), t.range.start, t.range.end))
            .collect();
        assert_eq!(
            ranges,
            vec![("The", 0, 2), ("boy", 4, 6), ("ran", 8, 10), (".", 11, 11)]
        );
        assert_eq!(seq.char_range(), OffsetRange::new(0, 11));
    }

    #[test]
    fn offsets_count_chars_and_respect_base() {
        let seq = TokenSequence::from_text("Zoë left", 100).unwrap();
        assert_eq!(seq.get(0).unwrap().range, OffsetRange::new(100, 102));
        assert_eq!(seq.get(1).unwrap().range, OffsetRange::new(104, 107));
    }

    #[test]
    fn whitespace_only_text_has_no_tokens() {
        assert!(TokenSequence::from_text("  \n ", 0).is_none());
    }

    #[test]
    fn rejects_overlapping_tokens() {
        let err = TokenSequence::new(vec![Token::new("ab", 0, 1), Token::new("b", 1, 1)]);
        assert!(err.is_err());
        assert!(TokenSequence::new(Vec::new()).is_err());
    }

    #[test]
    fn deserializing_applies_the_same_checks() {
        let seq = TokenSequence::from_text("The boy ran.", 0).unwrap();
        let back: TokenSequence = ron::from_str(&ron::to_string(&seq).unwrap()).unwrap();
        assert_eq!(back, seq);

        assert!(ron::from_str::<TokenSequence>("(tokens: [])").is_err());
        let overlapping = r#"(tokens: [(text: "ab", range: (start: 0, end: 1)), (text: "b", range: (start: 1, end: 1))])"#;
        assert!(ron::from_str::<TokenSequence>(overlapping).is_err());
    }

    #[test]
    fn exact_boundary_lookup() {
        let seq = TokenSequence::from_text("The boy ran.", 0).unwrap();
        assert_eq!(seq.span_for(OffsetRange::new(4, 10)), Some(TokenSpan::new(1, 2)));
        assert_eq!(seq.span_for(OffsetRange::new(5, 10)), None);
        assert_eq!(seq.span_for(OffsetRange::new(0, 9)), None);
        assert_eq!(seq.words(TokenSpan::new(0, 2)), "The boy ran");
    }
}
