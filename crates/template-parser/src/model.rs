//! Extracted template model: variables, the tags that hold them, and the
//! per-template aggregate.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use smol_str::SmolStr;
use template_span::{ByteOffset, RangeSet, Span};

/// One interpolation expression, merged per tag by normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// The full interpolation as written, delimiters included. Empty for
    /// synthetic variables.
    pub raw_expression: SmolStr,
    /// Identifier derived from the expression.
    pub name: SmolStr,
    /// Offset of the first occurrence's expression in the template.
    pub offset: ByteOffset,
    /// Attributes of the tag this variable appears in, sorted by name.
    pub attribute_names: BTreeSet<SmolStr>,
    /// Whether the variable appears in the tag's text content.
    pub is_text_occurrence: bool,
    /// Placeholder for an interactive tag that holds no variable.
    pub is_synthetic: bool,
}

impl Variable {
    fn new(raw_expression: &str, name: SmolStr, offset: ByteOffset) -> Self {
        Self {
            raw_expression: SmolStr::new(raw_expression),
            name,
            offset,
            attribute_names: BTreeSet::new(),
            is_text_occurrence: false,
            is_synthetic: false,
        }
    }
}

/// Position of an attribute value inside a tag's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSlot {
    /// Span of the value, without quotes.
    pub span: Span,
    /// Whether the value is quoted.
    pub quoted: bool,
    /// The attribute is written without `=value`; `span` is empty and sits
    /// right after the name.
    pub bare: bool,
}

/// A markup tag holding one or more variables.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// The tag name as written. Empty for the root.
    pub name: SmolStr,
    /// Span of the opening tag `<...>`. `None` for the virtual root that holds
    /// variables outside every tag.
    pub span: Option<Span>,
    /// Value of the identity attribute, either found in the source or assigned
    /// by a rewrite.
    pub identity: Option<SmolStr>,
    /// Where the identity attribute's value sits in the source, if the tag has
    /// one.
    pub identity_slot: Option<AttributeSlot>,
    /// The opening tag ends in `/>`.
    pub self_closing: bool,
    /// Variables keyed by name, in first-seen order.
    pub variables: IndexMap<SmolStr, Variable>,
}

impl Tag {
    /// Creates a tag for an opening tag at `span`.
    pub fn new(name: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            name: name.into(),
            span: Some(span),
            identity: None,
            identity_slot: None,
            self_closing: false,
            variables: IndexMap::new(),
        }
    }

    /// Creates the virtual root.
    pub fn root() -> Self {
        Self {
            name: SmolStr::default(),
            span: None,
            identity: None,
            identity_slot: None,
            self_closing: false,
            variables: IndexMap::new(),
        }
    }

    /// Returns true for real tags, false for the virtual root.
    pub fn has_parent_tag(&self) -> bool {
        self.span.is_some()
    }

    /// Returns true if at least one variable was attached.
    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// Returns true if the tag carries an identity value.
    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    /// Offset of the opening `<`.
    pub fn start(&self) -> Option<ByteOffset> {
        self.span.map(|span| span.start)
    }

    /// Offset just past the opening tag's `>`.
    pub fn end(&self) -> Option<ByteOffset> {
        self.span.map(|span| span.end)
    }

    /// Variables in first-seen order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Records an identity value for this tag.
    pub fn set_identity(&mut self, value: impl Into<SmolStr>) {
        self.identity = Some(value.into());
    }

    fn entry(&mut self, raw: &str, name: SmolStr, offset: ByteOffset) -> &mut Variable {
        self.variables
            .entry(name.clone())
            .or_insert_with(|| Variable::new(raw, name, offset))
    }

    /// Attaches a variable found in the tag's text content.
    pub fn add_text_variable(&mut self, raw: &str, name: SmolStr, offset: ByteOffset) {
        self.entry(raw, name, offset).is_text_occurrence = true;
    }

    /// Attaches a variable found in the value of `attribute`.
    pub fn add_attribute_variable(
        &mut self,
        raw: &str,
        name: SmolStr,
        offset: ByteOffset,
        attribute: &str,
    ) {
        self.entry(raw, name, offset)
            .attribute_names
            .insert(SmolStr::new(attribute));
    }

    /// Attaches a zero-width placeholder so the tag stays addressable.
    pub fn add_synthetic_variable(&mut self, name: SmolStr, offset: ByteOffset) {
        self.entry("", name, offset).is_synthetic = true;
    }
}

/// A tag variable with the accessor name a code generator would give it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor<'a> {
    /// The tag holding the variable.
    pub tag: &'a Tag,
    /// The variable.
    pub variable: &'a Variable,
    /// 1-based occurrence of the variable name across tags.
    pub occurrence: usize,
    /// Whether the tag lies in a repeated region.
    pub repeated: bool,
}

impl Accessor<'_> {
    /// The variable name, suffixed with its occurrence from the second
    /// occurrence on.
    pub fn name(&self) -> String {
        if self.occurrence == 1 {
            self.variable.name.to_string()
        } else {
            format!("{}{}", self.variable.name, self.occurrence)
        }
    }
}

/// Everything extracted from one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    template: String,
    tags: Vec<Tag>,
    root: Tag,
    repeated: RangeSet,
}

impl TemplateInfo {
    /// Builds the aggregate. Tags are ordered by the end of their opening tag.
    pub fn new(template: impl Into<String>, mut tags: Vec<Tag>, root: Tag, repeated: RangeSet) -> Self {
        tags.sort_by_key(|tag| tag.end());
        Self {
            template: template.into(),
            tags,
            root,
            repeated,
        }
    }

    /// The original template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Tags holding variables, ordered by end offset.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The virtual root with the variables that have no enclosing tag.
    pub fn root(&self) -> &Tag {
        &self.root
    }

    /// Ranges executed once per loop iteration.
    pub fn repeated_ranges(&self) -> &RangeSet {
        &self.repeated
    }

    /// Returns true if the tag starts inside a repeated region.
    pub fn is_repeated(&self, tag: &Tag) -> bool {
        tag.start()
            .is_some_and(|start| self.repeated.contains(start))
    }

    /// Every variable with its tag, root first, then tags in order.
    pub fn variables(&self) -> impl Iterator<Item = (&Tag, &Variable)> {
        std::iter::once(&self.root)
            .chain(&self.tags)
            .flat_map(|tag| tag.variables().map(move |variable| (tag, variable)))
    }

    /// Accessor names for the variables of every real tag.
    ///
    /// A name that appears in several tags is left bare the first time and
    /// suffixed with its occurrence count after that.
    pub fn accessors(&self) -> Vec<Accessor<'_>> {
        let mut seen: IndexMap<&str, usize> = IndexMap::new();
        let mut accessors = Vec::new();
        for tag in self.tags.iter().filter(|tag| tag.has_parent_tag()) {
            let repeated = self.is_repeated(tag);
            for variable in tag.variables() {
                let count = seen.entry(variable.name.as_str()).or_insert(0);
                *count += 1;
                accessors.push(Accessor {
                    tag,
                    variable,
                    occurrence: *count,
                    repeated,
                });
            }
        }
        accessors
    }

    /// The names of [`accessors`](Self::accessors), in the same order.
    pub fn accessor_names(&self) -> Vec<String> {
        self.accessors().iter().map(Accessor::name).collect()
    }

    /// The template text and the tags, for assigning identities in place.
    pub fn split_mut(&mut self) -> (&str, &mut [Tag]) {
        (&self.template, &mut self.tags)
    }
}
