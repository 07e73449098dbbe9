//! Normalized sets of half-open spans.

use crate::{ByteOffset, Span};

/// A set of non-overlapping, non-adjacent spans kept in ascending order.
///
/// Inserting a span merges it with every span it overlaps or touches, so the set
/// always holds the minimal number of disjoint spans. Membership is a binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeSet {
    spans: Vec<Span>,
}

impl RangeSet {
    /// Creates an empty range set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the set covers no offsets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Returns the number of disjoint spans in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns the disjoint spans in ascending order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Adds a span to the set. Empty spans cover nothing and are ignored.
    ///
    /// Returns true if the set covers more offsets afterwards.
    pub fn insert(&mut self, span: Span) -> bool {
        if span.is_empty() {
            return false;
        }

        // First span whose end reaches the new start; everything before it is untouched.
        let first = self.spans.partition_point(|s| s.end < span.start);
        // One past the last span whose start is within reach of the new end.
        let last = self.spans.partition_point(|s| s.start <= span.end);

        if first == last {
            self.spans.insert(first, span);
            return true;
        }

        let merged = self.spans[first..last]
            .iter()
            .fold(span, |acc, s| acc.cover(*s));
        let grew = last - first > 1 || merged != self.spans[first];
        self.spans.splice(first..last, std::iter::once(merged));
        grew
    }

    /// Adds every span of `other` to this set.
    pub fn union(&mut self, other: &RangeSet) {
        for span in &other.spans {
            self.insert(*span);
        }
    }

    /// Returns true if any span in the set contains `offset`.
    pub fn contains(&self, offset: ByteOffset) -> bool {
        let idx = self.spans.partition_point(|s| s.end <= offset);
        self.spans.get(idx).is_some_and(|s| s.contains(offset))
    }
}

impl FromIterator<Span> for RangeSet {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        let mut set = RangeSet::new();
        for span in iter {
            set.insert(span);
        }
        set
    }
}
