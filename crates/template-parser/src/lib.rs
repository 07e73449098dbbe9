//! Template variable extraction.
//!
//! This crate finds the interpolation expressions of a markup template, works
//! out which tag each one belongs to, and marks which parts of the template are
//! repeated by loops or excluded as call bodies:
//! - Lenient markup tokenizer (tag interiors lexed with `logos`)
//! - Range matching over loop, call and definition markers
//! - Built-in dialects for Closure Templates, EJS, ERB and Facelets
//!
//! # Example
//!
//! ```
//! use template_parser::{parse, Dialect, ParseOptions};
//!
//! let source = "<html><body>{$content}</body></html>";
//! let info = parse(source, Dialect::soy(), &ParseOptions::default()).unwrap();
//!
//! assert_eq!(info.tags().len(), 1);
//! assert_eq!(info.tags()[0].name.as_str(), "body");
//! ```

mod dialect;
mod error;
mod extractor;
mod lexer;
mod model;
pub mod naming;
pub mod ranges;

pub use dialect::{CallSyntax, Dialect, MarkerPair, VariableMatch};
pub use error::{ParseError, ParseErrorKind};
pub use extractor::Extractor;
pub use lexer::{Attribute, AttributeValue, MarkupEvent, StartTag, Tokenizer};
pub use model::{Accessor, AttributeSlot, Tag, TemplateInfo, Variable};
pub use template_span::{RangeSet, Span};

use template_span::MAX_SOURCE_LEN;

/// The attribute read for existing identities unless configured otherwise.
pub const DEFAULT_IDENTITY_ATTRIBUTE: &str = "id";

/// Options for parsing a template.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Attribute whose existing value identifies a tag.
    pub identity_attribute: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            identity_attribute: DEFAULT_IDENTITY_ATTRIBUTE.to_string(),
        }
    }
}

/// Parses a template into its tags, variables and repeated ranges.
///
/// Fails on unbalanced loop, call or definition markers, on markup the
/// tokenizer cannot finish and on templates longer than `u32::MAX` bytes; no
/// partial result is returned.
pub fn parse(
    source: &str,
    dialect: &Dialect,
    options: &ParseOptions,
) -> Result<TemplateInfo, ParseError> {
    check_source_len(source.len())?;
    let excluded = dialect.excluded_ranges(source)?;
    let repeated = dialect.repeated_ranges(source)?;

    let mut extractor = Extractor::new(dialect, &excluded, &options.identity_attribute);
    for event in Tokenizer::with_code_blocks(source, dialect.code_blocks(source)) {
        extractor.step(event?);
    }
    let (tags, root) = extractor.finish();

    tracing::debug!(
        dialect = dialect.name(),
        tags = tags.len(),
        root_variables = root.variables.len(),
        repeated_spans = repeated.len(),
        "parsed template"
    );
    Ok(TemplateInfo::new(source, tags, root, repeated))
}

fn check_source_len(len: usize) -> Result<(), ParseError> {
    if len > MAX_SOURCE_LEN {
        return Err(ParseError::new(
            ParseErrorKind::SourceTooLarge { len },
            Span::default(),
        ));
    }
    Ok(())
}
