//! Primitive ranges over character and token coordinates.
//!
//! Everything else in the crate is built on comparing and nesting these ranges.
//! Both kinds of range are inclusive on both ends, so a single-character token
//! at offset 11 is `[11-11]`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AnnotationError;

/// An inclusive character-offset range.
///
/// Ranges order by start, then by end, which is the order the minimal-tree
/// builder and the range map rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOffsetRange")]
pub struct OffsetRange {
    pub start: usize,
    pub end: usize,
}

impl OffsetRange {
    /// Create a range. `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted offset range [{}-{}]", start, end);
        Self { start, end }
    }

    /// Create a range, rejecting `start > end` as a malformed request.
    pub fn try_new(start: usize, end: usize) -> Result<Self, AnnotationError> {
        if start > end {
            return Err(AnnotationError::MalformedConstraint {
                constraint: format!("[{}-{}]", start, end),
                reason: "range start exceeds range end".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Number of offsets covered (inclusive range, so never zero).
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// True if `other` lies entirely within `self` (equal ranges contain each other).
    pub fn contains(&self, other: &OffsetRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// True if the ranges share at least one offset.
    pub fn intersects(&self, other: &OffsetRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True if the ranges partially overlap: they intersect but neither contains the other.
    pub fn crosses(&self, other: &OffsetRange) -> bool {
        self.intersects(other) && !self.contains(other) && !other.contains(self)
    }

    /// Non-crossing ranges are nested or disjoint, and can live in one tree.
    pub fn is_non_crossing_with(&self, other: &OffsetRange) -> bool {
        !self.crosses(other)
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &OffsetRange) -> OffsetRange {
        OffsetRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl Ord for OffsetRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl PartialOrd for OffsetRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.start, self.end)
    }
}

/// A reference to a token range within one sentence.
///
/// Both indices are inclusive and refer to token positions (not character positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTokenSpan")]
pub struct TokenSpan {
    /// Inclusive start token index
    pub start: usize,
    /// Inclusive end token index
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted token span {}..={}", start, end);
        Self { start, end }
    }

    /// A span covering exactly one token.
    pub fn single(token: usize) -> Self {
        Self {
            start: token,
            end: token,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, other: &TokenSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if `next` begins on the token right after this span ends.
    pub fn is_followed_by(&self, next: &TokenSpan) -> bool {
        self.end + 1 == next.start
    }
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}..=t{}", self.start, self.end)
    }
}

#[derive(Deserialize)]
#[serde(rename = "OffsetRange")]
struct RawOffsetRange {
    start: usize,
    end: usize,
}

impl TryFrom<RawOffsetRange> for OffsetRange {
    type Error = AnnotationError;

    fn try_from(raw: RawOffsetRange) -> Result<Self, Self::Error> {
        OffsetRange::try_new(raw.start, raw.end)
    }
}

#[derive(Deserialize)]
#[serde(rename = "TokenSpan")]
struct RawTokenSpan {
    start: usize,
    end: usize,
}

impl TryFrom<RawTokenSpan> for TokenSpan {
    type Error = AnnotationError;

    fn try_from(raw: RawTokenSpan) -> Result<Self, Self::Error> {
        if raw.start > raw.end {
            return Err(AnnotationError::StructuralInvariant(format!(
                "inverted token span t{}..=t{}",
                raw.start, raw.end
            )));
        }
        Ok(Self {
            start: raw.start,
            end: raw.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_order_by_start_then_end() {
        let mut ranges = vec![
            OffsetRange::new(4, 10),
            OffsetRange::new(0, 10),
            OffsetRange::new(4, 6),
            OffsetRange::new(0, 2),
        ];
        ranges.sort();
        assert_eq!(
            ranges,
            vec![
                OffsetRange::new(0, 2),
                OffsetRange::new(0, 10),
                OffsetRange::new(4, 6),
                OffsetRange::new(4, 10),
            ]
        );
    }

    #[test]
    fn nested_and_disjoint_ranges_do_not_cross() {
        let outer = OffsetRange::new(0, 10);
        let inner = OffsetRange::new(4, 6);
        let after = OffsetRange::new(11, 11);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.is_non_crossing_with(&inner));
        assert!(inner.is_non_crossing_with(&outer));
        assert!(outer.is_non_crossing_with(&after));
        assert!(!outer.intersects(&after));
    }

    #[test]
    fn partial_overlap_crosses() {
        let left = OffsetRange::new(0, 6);
        let right = OffsetRange::new(4, 10);
        assert!(left.crosses(&right));
        assert!(right.crosses(&left));
        assert!(!left.crosses(&left));
    }

    #[test]
    fn inclusive_length() {
        assert_eq!(OffsetRange::new(11, 11).len(), 1);
        assert_eq!(OffsetRange::new(0, 10).len(), 11);
        assert_eq!(TokenSpan::new(1, 2).len(), 2);
    }

    #[test]
    fn try_new_rejects_inverted_ranges() {
        assert!(OffsetRange::try_new(5, 4).is_err());
        assert_eq!(OffsetRange::try_new(4, 5).unwrap(), OffsetRange::new(4, 5));
    }

    #[test]
    fn deserializing_checks_range_order() {
        let range: OffsetRange = ron::from_str("(start: 4, end: 10)").unwrap();
        assert_eq!(range, OffsetRange::new(4, 10));
        assert!(ron::from_str::<OffsetRange>("(start: 9, end: 5)").is_err());
        assert!(ron::from_str::<TokenSpan>("(start: 2, end: 1)").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(OffsetRange::new(4, 10).to_string(), "[4-10]");
        assert_eq!(TokenSpan::new(1, 2).to_string(), "t1..=t2");
    }
}
