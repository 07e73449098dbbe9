//! How an identity value is written into a tag.

use std::ops::Range;

use template_parser::{Tag, Variable};

use crate::error::RewriteError;
use crate::markers::format_marker;

/// Where a new identity value goes inside an opening tag.
///
/// Offsets are relative to the opening tag's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// Keep `tag_text[..at]`, append the attribute, then close the tag.
    NewAttribute {
        /// End of the text kept before the new attribute.
        at: usize,
        /// Whether the tag closes with `/>`.
        self_closing: bool,
    },
    /// Put the value into the existing attribute value at `range`.
    ExistingValue {
        /// The value, without quotes.
        range: Range<usize>,
        /// Whether the value is quoted.
        quoted: bool,
    },
    /// Give a value to an attribute written without one, such as `<p id>`.
    BareAttribute {
        /// End of the attribute name.
        at: usize,
    },
}

impl Insertion {
    /// Rebuilds the opening tag with `attribute_text` or `value` spliced in.
    pub fn apply(&self, tag_text: &str, attribute_text: &str, value: &str) -> String {
        match self {
            Insertion::NewAttribute { at, self_closing } => {
                let tail = if *self_closing { " />" } else { ">" };
                format!("{}{}{}", &tag_text[..*at], attribute_text, tail)
            }
            Insertion::ExistingValue { range, quoted } => {
                let existing = &tag_text[range.clone()];
                let merged = if existing.trim().is_empty() {
                    value.to_string()
                } else {
                    format!("{value} {existing}")
                };
                let merged = if *quoted {
                    merged
                } else {
                    format!("\"{merged}\"")
                };
                format!(
                    "{}{}{}",
                    &tag_text[..range.start],
                    merged,
                    &tag_text[range.end..]
                )
            }
            Insertion::BareAttribute { at } => {
                format!("{}=\"{}\"{}", &tag_text[..*at], value, &tag_text[*at..])
            }
        }
    }
}

/// Where to add a new attribute to an opening tag: before `>`, or before `/>`
/// when the tag is self-closing, with trailing whitespace dropped.
///
/// A `/` ending an unquoted value, as in `<a href=/home/>`, is part of the value.
pub fn new_attribute_insertion(tag_text: &str, self_closing: bool) -> Insertion {
    let body = tag_text.strip_suffix('>').unwrap_or(tag_text);
    let body = if self_closing {
        body.strip_suffix('/').unwrap_or(body)
    } else {
        body
    };
    Insertion::NewAttribute {
        at: body.trim_end_matches(|c: char| c.is_ascii_whitespace()).len(),
        self_closing,
    }
}

/// The seam between the rewriter and the identity mechanism.
pub trait IdentityStrategy {
    /// The attribute carrying the identity.
    fn attribute(&self) -> &str;

    /// Returns true if the tag already has an identity and must not be touched.
    fn is_identified(&self, tag: &Tag) -> bool;

    /// Where a new value goes in `tag_text`, the tag's opening markup.
    ///
    /// An existing but empty identity attribute is filled in rather than
    /// duplicated.
    fn locate_insertion_point(&self, tag: &Tag, tag_text: &str) -> Insertion {
        let slot = tag.identity_slot.zip(tag.start());
        match slot {
            Some((slot, start)) if slot.bare => Insertion::BareAttribute {
                at: usize::from(slot.span.start) - usize::from(start),
            },
            Some((slot, start)) => {
                let start = usize::from(start);
                Insertion::ExistingValue {
                    range: usize::from(slot.span.start) - start..usize::from(slot.span.end) - start,
                    quoted: slot.quoted,
                }
            }
            None => new_attribute_insertion(tag_text, tag.self_closing),
        }
    }

    /// The ` name="value"` text for a new attribute.
    fn format_identity_insertion(&self, value: &str) -> String {
        format!(" {}=\"{}\"", self.attribute(), value)
    }

    /// Text emitted right before the tag for each of its variables.
    fn format_auxiliary_marker(&self, value: &str, variable: &Variable) -> Option<String>;
}

/// Writes the identity straight into an attribute such as `id`. Tags that
/// already have a value are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeStrategy {
    attribute: String,
}

impl AttributeStrategy {
    /// Creates a strategy for `attribute`.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

impl IdentityStrategy for AttributeStrategy {
    fn attribute(&self) -> &str {
        &self.attribute
    }

    fn is_identified(&self, tag: &Tag) -> bool {
        tag.has_identity()
    }

    fn format_auxiliary_marker(&self, _value: &str, _variable: &Variable) -> Option<String> {
        None
    }
}

/// Adds the identity as one more token of a value-collecting attribute such as
/// `class`, and emits a POGEN marker comment per variable before the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedAttributeStrategy {
    attribute: String,
    prefix: String,
}

impl MarkedAttributeStrategy {
    /// Creates a strategy for `attribute`; `prefix` recognises values from an
    /// earlier run and must not be empty.
    pub fn new(
        attribute: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self, RewriteError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(RewriteError::EmptyPrefix);
        }
        Ok(Self {
            attribute: attribute.into(),
            prefix,
        })
    }
}

impl IdentityStrategy for MarkedAttributeStrategy {
    fn attribute(&self) -> &str {
        &self.attribute
    }

    fn is_identified(&self, tag: &Tag) -> bool {
        tag.identity.as_deref().is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|token| token.starts_with(&self.prefix))
        })
    }

    fn format_auxiliary_marker(&self, value: &str, variable: &Variable) -> Option<String> {
        Some(format_marker(value, &variable.name, &variable.raw_expression))
    }
}

/// Picks the strategy for an attribute name: names ending in `class` collect
/// several values and get marker comments.
pub fn strategy_for(
    attribute: &str,
    prefix: &str,
) -> Result<Box<dyn IdentityStrategy + Send + Sync>, RewriteError> {
    if attribute.ends_with("class") {
        Ok(Box::new(MarkedAttributeStrategy::new(attribute, prefix)?))
    } else {
        Ok(Box::new(AttributeStrategy::new(attribute)))
    }
}
