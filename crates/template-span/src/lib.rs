//! Source offsets for template analysis.
//!
//! Every position the parser and rewriter deal in is a byte offset into the raw
//! template text. This crate holds the small vocabulary built on top of that:
//! spans for tags and markers, normalized sets of spans for "is this offset inside a
//! loop body / call body" questions, and a line index for reporting positions to
//! humans.

mod line_index;
mod range_set;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use range_set::RangeSet;
pub use span::{byte_offset, ByteOffset, Span, MAX_SOURCE_LEN};
