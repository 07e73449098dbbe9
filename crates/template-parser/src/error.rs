//! Parse error types.

use template_span::Span;
use thiserror::Error;

/// An error that aborted a template parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Start and end markers of a construct occur a different number of times.
    #[error("unbalanced {construct} markers: {starts} start marker(s), {ends} end marker(s)")]
    UnbalancedMarkers {
        /// The construct the markers delimit (loop, call, template).
        construct: &'static str,
        /// Number of start markers found.
        starts: usize,
        /// Number of end markers found.
        ends: usize,
    },

    /// An end marker has no open start marker to pair with.
    #[error("{construct} end marker has no matching start marker")]
    UnmatchedEndMarker {
        /// The construct the marker belongs to.
        construct: &'static str,
    },

    /// A markup tag is still open at end of input.
    #[error("unterminated tag: <{name}")]
    UnterminatedTag {
        /// The tag name as written.
        name: String,
    },

    /// A quoted attribute value is still open at end of input.
    #[error("unterminated value for attribute `{name}`")]
    UnterminatedAttributeValue {
        /// The attribute whose value was left open.
        name: String,
    },

    /// A markup comment is still open at end of input.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// The template is too long for its offsets to be represented.
    #[error("template is {len} bytes, more than the supported maximum")]
    SourceTooLarge {
        /// Length of the template in bytes.
        len: usize,
    },

    /// A dialect pattern failed to compile.
    #[error("invalid pattern: {message}")]
    InvalidPattern {
        /// The regex compiler's message.
        message: String,
    },
}

impl ParseErrorKind {
    /// Returns true for errors caused by loop, call or definition markers that
    /// cannot be paired.
    pub fn is_unbalanced(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::UnbalancedMarkers { .. } | ParseErrorKind::UnmatchedEndMarker { .. }
        )
    }
}

impl From<regex::Error> for ParseError {
    fn from(err: regex::Error) -> Self {
        ParseError::new(
            ParseErrorKind::InvalidPattern {
                message: err.to_string(),
            },
            Span::default(),
        )
    }
}
