//! Span and byte offset types for source positions.

use text_size::TextSize;

/// A byte offset into a template source.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` in a template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets as produced by `str` and regex APIs.
    ///
    /// Template sources are bounded by `u32::MAX` bytes, the same limit `TextSize` has.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        Self::new(byte_offset(start), byte_offset(end))
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true if this span contains the given offset.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }

    /// The span as a `usize` range, for slicing the source it was taken from.
    #[inline]
    pub fn range(self) -> std::ops::Range<usize> {
        usize::from(self.start)..usize::from(self.end)
    }
}

/// Largest source length, in bytes, that offsets can address.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// Converts a `usize` byte position into a [`ByteOffset`].
///
/// Positions past [`MAX_SOURCE_LEN`] saturate; sources that long must be
/// rejected before any offset is taken.
#[inline]
pub fn byte_offset(position: usize) -> ByteOffset {
    u32::try_from(position).map_or(TextSize::from(u32::MAX), TextSize::from)
}
