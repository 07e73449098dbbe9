//! Templating dialects.
//!
//! A [`Dialect`] is plain data: the interpolation pattern, the code-block
//! pattern, and the marker patterns for loops, call bodies, call sites and
//! template definitions. The
//! extraction pipeline is the same for every dialect; adding one means building
//! a new value, not a new type.

use std::sync::OnceLock;

use regex::Regex;
use template_span::{ByteOffset, RangeSet, Span};

use crate::error::ParseError;
use crate::ranges;

/// A pair of start/end marker patterns.
#[derive(Debug, Clone)]
pub struct MarkerPair {
    /// Opening marker.
    pub start: Regex,
    /// Closing marker.
    pub end: Regex,
}

impl MarkerPair {
    /// Compiles a marker pair.
    pub fn new(start: &str, end: &str) -> Result<Self, ParseError> {
        Ok(Self {
            start: Regex::new(start)?,
            end: Regex::new(end)?,
        })
    }
}

/// Markers of a dialect that can call one template from another.
#[derive(Debug, Clone)]
pub struct CallSyntax {
    /// A call with a body, such as `{call .t}` ... `{/call}`. Variables inside the
    /// body belong to the callee.
    pub body: MarkerPair,
    /// Any call site. Group 1 captures the callee name.
    pub site: Regex,
    /// A template definition. Group 1 of the start marker captures its name.
    pub definition: MarkerPair,
}

impl CallSyntax {
    /// Compiles the call markers.
    pub fn new(
        body_start: &str,
        body_end: &str,
        site: &str,
        definition_start: &str,
        definition_end: &str,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            body: MarkerPair::new(body_start, body_end)?,
            site: Regex::new(site)?,
            definition: MarkerPair::new(definition_start, definition_end)?,
        })
    }
}

/// One interpolation found by a dialect's variable pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableMatch<'t> {
    /// The whole interpolation, delimiters included.
    pub raw: &'t str,
    /// The expression inside the delimiters.
    pub expression: &'t str,
    /// Absolute offset of `expression`.
    pub offset: ByteOffset,
}

/// The pattern set of one templating syntax.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    variable: Regex,
    code: Option<Regex>,
    loops: Option<MarkerPair>,
    calls: Option<CallSyntax>,
}

impl Dialect {
    /// Creates a dialect with only a variable pattern.
    ///
    /// The expression is taken from the first capture group that participates in
    /// a match, or the whole match if the pattern has no groups.
    pub fn new(name: impl Into<String>, variable: &str) -> Result<Self, ParseError> {
        Ok(Self {
            name: name.into(),
            variable: Regex::new(variable)?,
            code: None,
            loops: None,
            calls: None,
        })
    }

    /// Adds the pattern of template code blocks, such as `<% ... %>`. Markup
    /// never starts inside a code block.
    pub fn with_code_blocks(mut self, pattern: &str) -> Result<Self, ParseError> {
        self.code = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Adds loop markers. Loops may nest.
    pub fn with_loops(mut self, start: &str, end: &str) -> Result<Self, ParseError> {
        self.loops = Some(MarkerPair::new(start, end)?);
        Ok(self)
    }

    /// Adds call and definition markers.
    pub fn with_calls(mut self, calls: CallSyntax) -> Self {
        self.calls = Some(calls);
        self
    }

    /// The dialect name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interpolation pattern.
    pub fn variable_pattern(&self) -> &Regex {
        &self.variable
    }

    /// Loop markers, if the dialect has loops.
    pub fn loops(&self) -> Option<&MarkerPair> {
        self.loops.as_ref()
    }

    /// Call markers, if the dialect has calls.
    pub fn calls(&self) -> Option<&CallSyntax> {
        self.calls.as_ref()
    }

    /// Finds interpolations in `text`, which starts at absolute offset `base`.
    pub fn find_variables<'t>(
        &'t self,
        text: &'t str,
        base: ByteOffset,
    ) -> impl Iterator<Item = VariableMatch<'t>> + 't {
        self.variable.captures_iter(text).filter_map(move |caps| {
            let whole = caps.get(0)?;
            let expression = caps.iter().skip(1).flatten().next().unwrap_or(whole);
            Some(VariableMatch {
                raw: whole.as_str(),
                expression: expression.as_str(),
                offset: base + template_span::byte_offset(expression.start()),
            })
        })
    }

    /// Spans of template code in `template`.
    pub fn code_blocks(&self, template: &str) -> RangeSet {
        let Some(code) = &self.code else {
            return RangeSet::new();
        };
        code.find_iter(template)
            .map(|found| Span::from_usize(found.start(), found.end()))
            .collect()
    }

    /// Ranges whose variables belong to a callee rather than this template.
    pub fn excluded_ranges(&self, template: &str) -> Result<RangeSet, ParseError> {
        match &self.calls {
            Some(calls) => {
                ranges::non_nested_ranges(template, &calls.body.start, &calls.body.end, "call")
            }
            None => Ok(RangeSet::new()),
        }
    }

    /// Ranges executed once per loop iteration, including definitions called
    /// from them.
    pub fn repeated_ranges(&self, template: &str) -> Result<RangeSet, ParseError> {
        let mut repeated = match &self.loops {
            Some(loops) => ranges::nested_ranges(template, &loops.start, &loops.end, "loop")?,
            None => RangeSet::new(),
        };

        if let Some(calls) = &self.calls {
            let definitions = ranges::named_ranges(
                template,
                &calls.definition.start,
                &calls.definition.end,
                "template",
            )?;
            let sites = ranges::named_markers(template, &calls.site);
            ranges::close_over_calls(&mut repeated, sites, &definitions);
        }
        Ok(repeated)
    }

    /// Closure Templates: `{$x}`, `{for}`/`{foreach}`, `{call}` and `{template}`.
    pub fn soy() -> &'static Dialect {
        static SOY: OnceLock<Dialect> = OnceLock::new();
        SOY.get_or_init(|| {
            builtin(
                Dialect::new("soy", r"\{\$([^{}|]*)(?:\|[^{}]*)?\}")
                    .and_then(|d| d.with_code_blocks(r"\{[^{}]*\}"))
                    .and_then(|d| d.with_loops(r"\{for", r"\{/for"))
                    .and_then(|d| {
                        Ok(d.with_calls(CallSyntax::new(
                            r"\{call\s+[^\s/}]+\}",
                            r"\{/call\}",
                            r"\{call\s+([^\s/}]+)",
                            r"\{template\s+([^\s}]+)",
                            r"\{/template",
                        )?))
                    }),
            )
        })
    }

    /// Embedded JavaScript: `<%= x %>` and `<%- x %>`, loops `<% for` ... `<% }`.
    pub fn ejs() -> &'static Dialect {
        static EJS: OnceLock<Dialect> = OnceLock::new();
        EJS.get_or_init(|| {
            builtin(
                Dialect::new("ejs", r"<%[=-]\s*(.*?)%>")
                    .and_then(|d| d.with_code_blocks(r"<%[\s\S]*?%>"))
                    .and_then(|d| d.with_loops(r"<%\s*for", r"<%\s*\}")),
            )
        })
    }

    /// Embedded Ruby: `<%= x %>`, with the same loop markers as EJS.
    pub fn erb() -> &'static Dialect {
        static ERB: OnceLock<Dialect> = OnceLock::new();
        ERB.get_or_init(|| {
            builtin(
                Dialect::new("erb", r"<%=\s*(.*?)%>")
                    .and_then(|d| d.with_code_blocks(r"<%[\s\S]*?%>"))
                    .and_then(|d| d.with_loops(r"<%\s*for", r"<%\s*\}")),
            )
        })
    }

    /// Facelets: `#{x}`. Repetition uses prefixed tags, which are never scanned.
    pub fn jsf() -> &'static Dialect {
        static JSF: OnceLock<Dialect> = OnceLock::new();
        JSF.get_or_init(|| builtin(
                Dialect::new("jsf", r"#\{([^{}]+)\}")
                    .and_then(|d| d.with_code_blocks(r"#\{[^{}]*\}")),
            ))
    }

    /// All built-in dialects.
    pub fn builtins() -> [&'static Dialect; 4] {
        [Self::soy(), Self::ejs(), Self::erb(), Self::jsf()]
    }

    /// Looks up a built-in dialect by name.
    pub fn by_name(name: &str) -> Option<&'static Dialect> {
        Self::builtins()
            .into_iter()
            .find(|dialect| dialect.name.eq_ignore_ascii_case(name))
    }

    /// Picks a built-in dialect from a file path's extension. Unknown extensions
    /// are treated as Closure Templates.
    pub fn for_path(path: &str) -> &'static Dialect {
        if path.ends_with(".ejs") {
            Self::ejs()
        } else if path.ends_with(".erb") {
            Self::erb()
        } else if path.ends_with(".xhtml") {
            Self::jsf()
        } else {
            Self::soy()
        }
    }
}

fn builtin(dialect: Result<Dialect, ParseError>) -> Dialect {
    dialect.expect("built-in dialect patterns compile")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use template_span::byte_offset;

    fn expressions(dialect: &Dialect, text: &str) -> Vec<(String, u32)> {
        dialect
            .find_variables(text, byte_offset(0))
            .map(|m| (m.expression.to_string(), m.offset.into()))
            .collect()
    }

    #[test]
    fn test_soy_variables() {
        assert_eq!(
            expressions(Dialect::soy(), "a{$x}{$p.title|escapeUri}"),
            vec![("x".to_string(), 3), ("p.title".to_string(), 7)]
        );
    }

    #[test]
    fn test_soy_raw_includes_directive() {
        let found: Vec<_> = Dialect::soy()
            .find_variables("{$t|noAutoescape}", byte_offset(10))
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "{$t|noAutoescape}");
        assert_eq!(found[0].offset, byte_offset(12));
    }

    #[test]
    fn test_ejs_and_jsf_variables() {
        assert_eq!(
            expressions(Dialect::ejs(), "<%=v1%>abc<%- v2 %>"),
            vec![("v1".to_string(), 3), ("v2 ".to_string(), 14)]
        );
        assert_eq!(
            expressions(Dialect::jsf(), "<p>#{bean.name}</p>"),
            vec![("bean.name".to_string(), 5)]
        );
    }

    #[test]
    fn test_for_path() {
        assert_eq!(Dialect::for_path("views/index.ejs").name(), "ejs");
        assert_eq!(Dialect::for_path("app/show.erb").name(), "erb");
        assert_eq!(Dialect::for_path("faces/page.xhtml").name(), "jsf");
        assert_eq!(Dialect::for_path("templates/page.soy").name(), "soy");
        assert_eq!(Dialect::for_path("page.html").name(), "soy");
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Dialect::by_name("ERB").map(Dialect::name), Some("erb"));
        assert!(Dialect::by_name("jinja").is_none());
    }

    #[test]
    fn test_custom_dialect() {
        let dialect = Dialect::new("mustache", r"\{\{\s*([^}]*?)\s*\}\}")
            .and_then(|d| d.with_loops(r"\{\{#", r"\{\{/"))
            .unwrap();
        assert_eq!(
            expressions(&dialect, "{{ name }}"),
            vec![("name".to_string(), 3)]
        );
        let repeated = dialect.repeated_ranges("{{#items}}{{x}}{{/items}}").unwrap();
        assert!(repeated.contains(byte_offset(12)));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Dialect::new("broken", r"(").unwrap_err();
        assert!(matches!(
            err.kind,
            crate::ParseErrorKind::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_code_blocks() {
        let spans = |dialect: &Dialect, text: &str| -> Vec<(u32, u32)> {
            dialect
                .code_blocks(text)
                .spans()
                .iter()
                .map(|span| (span.start.into(), span.end.into()))
                .collect()
        };
        assert_eq!(
            spans(Dialect::ejs(), "<p><% if (a<b) {\n %>x<%= y %></p>"),
            vec![(3, 20), (21, 29)]
        );
        assert_eq!(spans(Dialect::soy(), "<p>{if $a<$b}x{/if}</p>"), vec![(3, 13), (14, 19)]);
        assert_eq!(spans(Dialect::jsf(), "<p>#{a<b}</p>"), vec![(3, 9)]);
        assert!(Dialect::new("plain", r"\$\w+").unwrap().code_blocks("<p>$x</p>").is_empty());
    }

    #[test]
    fn test_dialect_without_calls_excludes_nothing() {
        assert!(Dialect::ejs()
            .excluded_ranges("<% for (x of xs) { %><%= x %><% } %>")
            .unwrap()
            .is_empty());
    }
}
