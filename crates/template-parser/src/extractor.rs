//! Variable extraction over the markup event stream.
//!
//! [`Extractor`] is an explicit state machine: [`Extractor::step`] reduces one
//! markup event into the open-tag stack, and [`Extractor::finish`] consumes the
//! extractor, closes whatever is still open and hands back the tags. A finished
//! extractor cannot be fed again.

use smol_str::SmolStr;
use template_span::{ByteOffset, RangeSet, Span};

use crate::dialect::Dialect;
use crate::lexer::{MarkupEvent, StartTag};
use crate::model::{AttributeSlot, Tag};
use crate::naming;

/// Tags that stay addressable even without a variable.
const INTERACTIVE_TAGS: [&str; 6] = ["a", "link", "input", "button", "textarea", "select"];

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Debug)]
struct OpenTag {
    tag: Tag,
    id_attr: Option<SmolStr>,
    name_attr: Option<SmolStr>,
}

/// Attributes variables to their innermost enclosing tag.
#[derive(Debug)]
pub struct Extractor<'a> {
    dialect: &'a Dialect,
    excluded: &'a RangeSet,
    identity_attribute: &'a str,
    stack: Vec<OpenTag>,
    root: Tag,
    closed: Vec<Tag>,
    last_text: String,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor for one template.
    pub fn new(dialect: &'a Dialect, excluded: &'a RangeSet, identity_attribute: &'a str) -> Self {
        Self {
            dialect,
            excluded,
            identity_attribute,
            stack: Vec::new(),
            root: Tag::root(),
            closed: Vec::new(),
            last_text: String::new(),
        }
    }

    /// Feeds one markup event.
    pub fn step(&mut self, event: MarkupEvent<'_>) {
        match event {
            MarkupEvent::StartTag(start) => {
                self.last_text.clear();
                if is_prefixed(start.name) {
                    return;
                }
                let self_closing = start.self_closing
                    || VOID_ELEMENTS
                        .iter()
                        .any(|void| start.name.eq_ignore_ascii_case(void));
                let open = self.open_tag(&start);
                if self_closing {
                    self.close(open, "");
                } else {
                    self.stack.push(open);
                }
            }
            MarkupEvent::Text { text, span } => {
                self.text(text, span);
                self.last_text.push_str(text);
            }
            MarkupEvent::EndTag { name, .. } => {
                let text = std::mem::take(&mut self.last_text);
                if is_prefixed(name) {
                    return;
                }
                let Some(depth) = self
                    .stack
                    .iter()
                    .rposition(|open| open.tag.name.eq_ignore_ascii_case(name))
                else {
                    tracing::trace!(name, "ignoring end tag with no open element");
                    return;
                };
                self.close_from(depth, &text);
            }
        }
    }

    /// Closes every tag still open and returns the tags that hold variables,
    /// ordered by end offset, along with the root.
    pub fn finish(mut self) -> (Vec<Tag>, Tag) {
        let text = std::mem::take(&mut self.last_text);
        self.close_from(0, &text);
        self.closed.sort_by_key(Tag::end);
        (self.closed, self.root)
    }

    fn is_excluded(&self, offset: ByteOffset) -> bool {
        self.excluded.contains(offset)
    }

    fn open_tag(&self, start: &StartTag<'_>) -> OpenTag {
        let mut tag = Tag::new(start.name, start.span);
        tag.self_closing = start.self_closing;
        let mut id_attr = None;
        let mut name_attr = None;

        for attr in &start.attributes {
            if attr.name.eq_ignore_ascii_case(self.identity_attribute) && tag.identity_slot.is_none() {
                tag.identity_slot = Some(match attr.value {
                    Some(value) => AttributeSlot {
                        span: value.span,
                        quoted: value.quoted,
                        bare: false,
                    },
                    None => AttributeSlot {
                        span: Span::new(attr.name_span.end, attr.name_span.end),
                        quoted: false,
                        bare: true,
                    },
                });
                if let Some(value) = attr.value.filter(|value| !value.text.is_empty()) {
                    tag.set_identity(value.text);
                }
            }
            let Some(value) = attr.value else {
                continue;
            };
            if attr.name.eq_ignore_ascii_case("id") {
                id_attr = Some(SmolStr::new(value.text));
            } else if attr.name.eq_ignore_ascii_case("name") {
                name_attr = Some(SmolStr::new(value.text));
            }

            for found in self.dialect.find_variables(value.text, value.span.start) {
                let name = naming::identifier(found.expression);
                if name.is_empty() || self.is_excluded(found.offset) {
                    continue;
                }
                tag.add_attribute_variable(found.raw, name.into(), found.offset, attr.name);
            }
        }

        OpenTag {
            tag,
            id_attr,
            name_attr,
        }
    }

    fn text(&mut self, text: &str, span: Span) {
        let target = match self.stack.last_mut() {
            Some(open) => &mut open.tag,
            None => &mut self.root,
        };
        for found in self.dialect.find_variables(text, span.start) {
            let name = naming::identifier(found.expression);
            if name.is_empty() || self.excluded.contains(found.offset) {
                continue;
            }
            target.add_text_variable(found.raw, name.into(), found.offset);
        }
    }

    /// Pops the stack down to `depth`. Pending text belongs to the innermost
    /// tag only.
    fn close_from(&mut self, depth: usize, text: &str) {
        let mut text = text;
        while self.stack.len() > depth {
            let Some(open) = self.stack.pop() else {
                break;
            };
            self.close(open, text);
            text = "";
        }
    }

    fn close(&mut self, open: OpenTag, text: &str) {
        let OpenTag {
            mut tag,
            id_attr,
            name_attr,
        } = open;

        let interactive = INTERACTIVE_TAGS
            .iter()
            .any(|name| tag.name.eq_ignore_ascii_case(name));
        if interactive && !tag.has_variables() {
            if let Some(start) = tag.start().filter(|start| !self.is_excluded(*start)) {
                let name = naming::interactive_tag_name(
                    &tag.name.to_ascii_lowercase(),
                    name_attr.as_deref(),
                    id_attr.as_deref(),
                    text,
                );
                tracing::trace!(tag = %tag.name, %name, "synthesized variable for interactive tag");
                tag.add_synthetic_variable(name.into(), start);
            }
        }

        if tag.has_variables() {
            self.closed.push(tag);
        }
    }
}

/// Namespaced tags such as `c:forEach` or `ui:repeat` belong to a foreign
/// vocabulary and are not addressable.
fn is_prefixed(name: &str) -> bool {
    name.contains(':')
}
