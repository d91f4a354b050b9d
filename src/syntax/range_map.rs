//! An ordered map keyed by offset range, with enclosure and crossing queries.
//!
//! Keys are kept in `OffsetRange` order (start, then end). Queries never assume
//! the stored ranges are disjoint, so the map can hold an arbitrary bracketing.

use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound;

use crate::OffsetRange;

#[derive(Debug, Clone, PartialEq)]
pub struct RangeMap<V> {
    entries: BTreeMap<OffsetRange, V>,
}

impl<V> Default for RangeMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> RangeMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert under an exact key, returning the value previously stored there.
    pub fn insert(&mut self, range: OffsetRange, value: V) -> Option<V> {
        self.entries.insert(range, value)
    }

    pub fn remove(&mut self, range: &OffsetRange) -> Option<V> {
        self.entries.remove(range)
    }

    /// Exact-key lookup.
    pub fn get(&self, range: &OffsetRange) -> Option<&V> {
        self.entries.get(range)
    }

    pub fn contains_key(&self, range: &OffsetRange) -> bool {
        self.entries.contains_key(range)
    }

    /// Entries in range order.
    pub fn iter(&self) -> btree_map::Iter<'_, OffsetRange, V> {
        self.entries.iter()
    }

    pub fn into_values(self) -> btree_map::IntoValues<OffsetRange, V> {
        self.entries.into_values()
    }

    /// Entries whose key lies entirely inside `range` (including `range` itself).
    pub fn enclosed_by(&self, range: OffsetRange) -> impl Iterator<Item = (&OffsetRange, &V)> {
        self.starting_within(range)
            .filter(move |(key, _)| key.end <= range.end)
    }

    /// Entries whose key shares offsets with `range` without nesting either way.
    pub fn crossing(&self, range: OffsetRange) -> impl Iterator<Item = (&OffsetRange, &V)> {
        // Keys starting before `range` can only cross by ending inside it; keys
        // starting inside can only cross by ending after it.
        let first_at_start = OffsetRange {
            start: range.start,
            end: 0,
        };
        let before = self
            .entries
            .range(..first_at_start)
            .filter(move |(key, _)| key.end >= range.start && key.end < range.end);
        let within = self
            .starting_within(range)
            .filter(move |(key, _)| key.start > range.start && key.end > range.end);
        before.chain(within)
    }

    /// Entries whose key contains `range` (including `range` itself).
    pub fn covering(&self, range: OffsetRange) -> impl Iterator<Item = (&OffsetRange, &V)> {
        self.entries
            .range(..=OffsetRange::new(range.start, usize::MAX))
            .filter(move |(key, _)| key.contains(&range))
    }

    fn starting_within(&self, range: OffsetRange) -> btree_map::Range<'_, OffsetRange, V> {
        self.entries.range((
            Bound::Included(OffsetRange::new(range.start, range.start)),
            Bound::Included(OffsetRange::new(range.end, usize::MAX)),
        ))
    }
}

impl<V> FromIterator<(OffsetRange, V)> for RangeMap<V> {
    fn from_iter<T: IntoIterator<Item = (OffsetRange, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
