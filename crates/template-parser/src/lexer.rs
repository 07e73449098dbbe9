//! Lenient markup tokenizer.
//!
//! Splits a template into start tags, end tags and text runs, in source order.
//! Only `<name`, `</name`, comments, doctypes, CDATA sections and processing
//! instructions are treated as markup; everything else, including template
//! syntax such as `<%= x %>` or `{$x}`, stays text. A `<` inside a template code
//! block handed to [`Tokenizer::with_code_blocks`] never opens markup. Tag
//! interiors are lexed with `logos`.

use logos::Logos;
use template_span::{byte_offset, RangeSet, Span};

use crate::error::{ParseError, ParseErrorKind};

/// Tokens inside a start tag, after the tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\x0C]+")]
enum TagToken {
    /// `>`
    #[token(">")]
    Close,

    /// `/>`
    #[token("/>")]
    SelfClose,

    /// A `/` that does not close the tag.
    #[token("/")]
    Slash,

    /// `=`
    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// An attribute name. Quotes are allowed after the first character.
    #[regex(r#"[^ \t\r\n\x0C"'=>/][^ \t\r\n\x0C=>/]*"#)]
    Word,
}

/// An attribute value as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeValue<'src> {
    /// The value without surrounding quotes.
    pub text: &'src str,
    /// Absolute span of `text`.
    pub span: Span,
    /// Whether the value was wrapped in quotes.
    pub quoted: bool,
}

/// One attribute of a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'src> {
    /// The attribute name as written.
    pub name: &'src str,
    /// Absolute span of `name`.
    pub name_span: Span,
    /// The value, absent for bare attributes such as `disabled`.
    pub value: Option<AttributeValue<'src>>,
}

/// A start tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'src> {
    /// The tag name as written.
    pub name: &'src str,
    /// Attributes in source order.
    pub attributes: Vec<Attribute<'src>>,
    /// Span of the whole tag, from `<` through `>`.
    pub span: Span,
    /// Whether the tag ended with `/>`.
    pub self_closing: bool,
}

impl<'src> StartTag<'src> {
    /// Returns the first attribute whose name matches, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&Attribute<'src>> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }
}

/// A markup event produced by the [`Tokenizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent<'src> {
    /// `<name attr="value">` or `<name/>`.
    StartTag(StartTag<'src>),
    /// A run of character data between markup.
    Text {
        /// The text as written.
        text: &'src str,
        /// Absolute span of the text.
        span: Span,
    },
    /// `</name>`.
    EndTag {
        /// The tag name as written.
        name: &'src str,
        /// Span of the whole end tag.
        span: Span,
    },
}

/// Iterator over the markup events of a template.
///
/// Stops after the first error.
pub struct Tokenizer<'src> {
    source: &'src str,
    code: RangeSet,
    pos: usize,
    raw_text_tag: Option<&'src str>,
    finished: bool,
}

impl<'src> Tokenizer<'src> {
    /// Creates a tokenizer over the given source.
    pub fn new(source: &'src str) -> Self {
        Self::with_code_blocks(source, RangeSet::new())
    }

    /// Creates a tokenizer that keeps the given template code blocks as text.
    pub fn with_code_blocks(source: &'src str, code: RangeSet) -> Self {
        Self {
            source,
            code,
            pos: 0,
            raw_text_tag: None,
            finished: false,
        }
    }

    fn text(&self, start: usize, end: usize) -> MarkupEvent<'src> {
        MarkupEvent::Text {
            text: &self.source[start..end],
            span: Span::from_usize(start, end),
        }
    }

    /// Offset of the next `<` that opens markup, at or after `from`.
    fn next_markup(&self, from: usize) -> Option<usize> {
        self.source[from..]
            .match_indices('<')
            .map(|(idx, _)| from + idx)
            .find(|&idx| {
                opens_markup(&self.source.as_bytes()[idx..])
                    && !self.code.contains(byte_offset(idx))
            })
    }

    /// Offset of the `</name` that ends a raw text element, or end of input.
    fn raw_text_end(&self, tag: &str) -> usize {
        let bytes = self.source.as_bytes();
        self.source[self.pos..]
            .match_indices("</")
            .map(|(idx, _)| self.pos + idx)
            .find(|&idx| {
                let name_start = idx + 2;
                bytes
                    .get(name_start..name_start + tag.len())
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag.as_bytes()))
            })
            .unwrap_or(self.source.len())
    }

    fn name_end(&self, from: usize) -> usize {
        self.source.as_bytes()[from..]
            .iter()
            .position(|&b| is_html_space(b) || b == b'/' || b == b'>')
            .map_or(self.source.len(), |idx| from + idx)
    }

    fn unterminated_tag(&self, start: usize, name: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnterminatedTag {
                name: name.to_string(),
            },
            Span::from_usize(start, self.source.len()),
        )
    }

    /// Reads the markup construct at `start`. Returns `None` for constructs that
    /// produce no event.
    fn read_markup(&mut self, start: usize) -> Result<Option<MarkupEvent<'src>>, ParseError> {
        let rest = &self.source[start..];

        if rest.starts_with("<!--") {
            let close = rest[4..].find("-->").ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnterminatedComment,
                    Span::from_usize(start, self.source.len()),
                )
            })?;
            self.pos = start + 4 + close + 3;
            return Ok(None);
        }

        if rest.starts_with("<![CDATA[") {
            let close = rest
                .find("]]>")
                .ok_or_else(|| self.unterminated_tag(start, "![CDATA["))?;
            self.pos = start + close + 3;
            return Ok(None);
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let name = &self.source[start + 1..self.name_end(start + 1)];
            let close = rest
                .find('>')
                .ok_or_else(|| self.unterminated_tag(start, name))?;
            self.pos = start + close + 1;
            return Ok(None);
        }

        if rest.starts_with("</") {
            let name_start = start + 2;
            let name_end = self.name_end(name_start);
            let name = &self.source[name_start..name_end];
            let close = self.source[name_end..]
                .find('>')
                .ok_or_else(|| self.unterminated_tag(start, name))?;
            let end = name_end + close + 1;
            self.pos = end;
            return Ok(Some(MarkupEvent::EndTag {
                name,
                span: Span::from_usize(start, end),
            }));
        }

        let tag = self.read_start_tag(start)?;
        if !tag.self_closing && is_raw_text_element(tag.name) {
            self.raw_text_tag = Some(tag.name);
        }
        Ok(Some(MarkupEvent::StartTag(tag)))
    }

    fn read_start_tag(&mut self, start: usize) -> Result<StartTag<'src>, ParseError> {
        let source = self.source;
        let name_start = start + 1;
        let base = self.name_end(name_start);
        let name = &source[name_start..base];

        let mut lexer = TagToken::lexer(&source[base..]);
        let mut attributes: Vec<Attribute<'src>> = Vec::new();
        let mut expecting_value = false;

        loop {
            let Some(token) = lexer.next() else {
                return Err(self.unterminated_tag(start, name));
            };
            let range = lexer.span();

            match token {
                Ok(TagToken::Close) | Ok(TagToken::SelfClose) => {
                    let end = base + range.end;
                    self.pos = end;
                    return Ok(StartTag {
                        name,
                        attributes,
                        span: Span::from_usize(start, end),
                        self_closing: token == Ok(TagToken::SelfClose),
                    });
                }
                Ok(TagToken::Slash) => expecting_value = false,
                Ok(TagToken::Eq) => {
                    let Some(attr) = attributes.last_mut().filter(|a| a.value.is_none()) else {
                        continue;
                    };
                    let rest = lexer.remainder();
                    let trimmed = rest.trim_start_matches(|c: char| c.is_ascii() && is_html_space(c as u8));
                    if trimmed.starts_with(['"', '\'']) {
                        expecting_value = true;
                        continue;
                    }
                    // Unquoted values run to the next space or `>`.
                    let skipped = rest.len() - trimmed.len();
                    let len = trimmed
                        .find(|c: char| c == '>' || (c.is_ascii() && is_html_space(c as u8)))
                        .unwrap_or(trimmed.len());
                    let value_start = base + range.end + skipped;
                    let value_end = value_start + len;
                    attr.value = Some(AttributeValue {
                        text: &source[value_start..value_end],
                        span: Span::from_usize(value_start, value_end),
                        quoted: false,
                    });
                    lexer.bump(skipped + len);
                    expecting_value = false;
                }
                Ok(TagToken::DoubleQuoted) | Ok(TagToken::SingleQuoted) => {
                    if !expecting_value {
                        continue;
                    }
                    expecting_value = false;
                    let value_start = base + range.start + 1;
                    let value_end = base + range.end - 1;
                    if let Some(attr) = attributes.last_mut() {
                        attr.value = Some(AttributeValue {
                            text: &source[value_start..value_end],
                            span: Span::from_usize(value_start, value_end),
                            quoted: true,
                        });
                    }
                }
                Ok(TagToken::Word) => {
                    expecting_value = false;
                    attributes.push(Attribute {
                        name: lexer.slice(),
                        name_span: Span::from_usize(base + range.start, base + range.end),
                        value: None,
                    });
                }
                Err(()) => {
                    // Only an opening quote without its closing quote fails to lex.
                    let attr_name = attributes
                        .last()
                        .filter(|_| expecting_value)
                        .map_or("", |attr| attr.name);
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedAttributeValue {
                            name: attr_name.to_string(),
                        },
                        Span::from_usize(base + range.start, source.len()),
                    ));
                }
            }
        }
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Result<MarkupEvent<'src>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished || self.pos >= self.source.len() {
                self.finished = true;
                return None;
            }

            let start = self.pos;

            if let Some(tag) = self.raw_text_tag.take() {
                let end = self.raw_text_end(tag);
                self.pos = end;
                if end > start {
                    return Some(Ok(self.text(start, end)));
                }
                continue;
            }

            match self.next_markup(start) {
                Some(idx) if idx > start => {
                    self.pos = idx;
                    return Some(Ok(self.text(start, idx)));
                }
                Some(idx) => match self.read_markup(idx) {
                    Ok(Some(event)) => return Some(Ok(event)),
                    Ok(None) => continue,
                    Err(err) => {
                        self.finished = true;
                        return Some(Err(err));
                    }
                },
                None => {
                    self.pos = self.source.len();
                    return Some(Ok(self.text(start, self.source.len())));
                }
            }
        }
    }
}

/// Returns true if `bytes` (starting at a `<`) opens a markup construct.
fn opens_markup(bytes: &[u8]) -> bool {
    match bytes.get(1) {
        Some(b) if b.is_ascii_alphabetic() => true,
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => bytes.get(2).is_some_and(|b| b.is_ascii_alphabetic()),
        _ => false,
    }
}

fn is_html_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C)
}

fn is_raw_text_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}
