//! POGEN marker comments.
//!
//! A marker records which identity value was given to the tag holding a
//! variable, and the variable's literal text:
//! `<!--POGEN,{value},{variable name},{literal expression}-->`.

use std::sync::OnceLock;

use regex::Regex;

/// One parsed marker comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'t> {
    /// Identity value of the tag.
    pub attribute_value: &'t str,
    /// Normalized variable name.
    pub variable_name: &'t str,
    /// The variable's interpolation as written in the template.
    pub literal: &'t str,
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<!--POGEN,([^,]*),([^,]*),(.*?)-->").expect("marker pattern compiles")
    })
}

/// Formats a marker comment.
pub fn format_marker(attribute_value: &str, variable_name: &str, literal: &str) -> String {
    format!("<!--POGEN,{attribute_value},{variable_name},{literal}-->")
}

/// Finds every marker comment in `text`, in document order.
pub fn parse_markers(text: &str) -> Vec<Marker<'_>> {
    marker_pattern()
        .captures_iter(text)
        .map(|caps| {
            let group = |idx| caps.get(idx).map_or("", |m| m.as_str());
            Marker {
                attribute_value: group(1),
                variable_name: group(2),
                literal: group(3),
            }
        })
        .collect()
}
