//! Template rewriting.
//!
//! Given a parsed [`TemplateInfo`], [`rewrite`] gives every tag that holds a
//! variable but has no identity a fresh identifying attribute value, so a page
//! object can locate the element later. The surrounding text is copied through
//! byte for byte.
//!
//! # Example
//!
//! ```
//! use template_parser::{parse, Dialect, ParseOptions};
//! use template_rewriter::{Rewriter, ValueGenerator};
//!
//! let mut info = parse(
//!     "<html><body>{$content}</body></html>",
//!     Dialect::soy(),
//!     &ParseOptions::default(),
//! )
//! .unwrap();
//! let mut generator = ValueGenerator::new("_");
//! let out = Rewriter::new("id", "_")?.rewrite(&mut info, &mut generator);
//!
//! assert_eq!(out, "<html><body id=\"_0\">{$content}</body></html>");
//! # Ok::<(), template_rewriter::RewriteError>(())
//! ```

mod error;
mod generator;
mod markers;
mod rewrite;
mod section;
mod strategy;

pub use error::RewriteError;
pub use generator::{ValueGenerator, DEFAULT_PREFIX};
pub use markers::{format_marker, parse_markers, Marker};
pub use rewrite::{rewrite, Rewriter};
pub use section::{
    splice_generated_section, update_generated_section, GENERATED_CODE_END, GENERATED_CODE_START,
};
pub use strategy::{
    new_attribute_insertion, strategy_for, AttributeStrategy, IdentityStrategy, Insertion,
    MarkedAttributeStrategy,
};

pub use template_parser::TemplateInfo;
