//! Template rewriting.

use template_parser::TemplateInfo;

use crate::error::RewriteError;
use crate::generator::ValueGenerator;
use crate::strategy::{strategy_for, IdentityStrategy};

/// Rewrites templates with one identity strategy.
pub struct Rewriter {
    strategy: Box<dyn IdentityStrategy + Send + Sync>,
}

impl Rewriter {
    /// Creates a rewriter for `attribute`, choosing the strategy from its name.
    pub fn new(attribute: &str, prefix: &str) -> Result<Self, RewriteError> {
        Ok(Self {
            strategy: strategy_for(attribute, prefix)?,
        })
    }

    /// The strategy in use.
    pub fn strategy(&self) -> &dyn IdentityStrategy {
        self.strategy.as_ref()
    }

    /// Rewrites the template of `info`. See [`rewrite`].
    pub fn rewrite(&self, info: &mut TemplateInfo, generator: &mut ValueGenerator) -> String {
        rewrite(info, self.strategy(), generator)
    }
}

impl std::fmt::Debug for Rewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rewriter")
            .field("attribute", &self.strategy.attribute())
            .finish()
    }
}

/// Gives every variable-bearing tag without an identity a fresh value and
/// returns the new template text.
///
/// Tags are visited in end-offset order and the text between them is copied
/// through untouched, so earlier insertions never move a later tag. Each
/// assigned value is recorded on its tag. Variables with no enclosing tag stay
/// unaddressable.
pub fn rewrite(
    info: &mut TemplateInfo,
    strategy: &dyn IdentityStrategy,
    generator: &mut ValueGenerator,
) -> String {
    let (template, tags) = info.split_mut();
    let mut out = String::with_capacity(template.len() + tags.len() * 16);
    let mut cursor = 0;

    for tag in tags.iter_mut() {
        let Some(span) = tag.span else {
            continue;
        };
        let range = span.range();
        if range.start < cursor {
            tracing::debug!(tag = %tag.name, "skipping tag overlapping a rewritten one");
            continue;
        }

        out.push_str(&template[cursor..range.start]);
        cursor = range.end;
        let tag_text = &template[range];

        if strategy.is_identified(tag) {
            out.push_str(tag_text);
            continue;
        }

        let value = generator.next_value();
        for variable in tag.variables() {
            if let Some(marker) = strategy.format_auxiliary_marker(&value, variable) {
                out.push_str(&marker);
            }
        }
        let insertion = strategy.locate_insertion_point(tag, tag_text);
        let attribute_text = strategy.format_identity_insertion(&value);
        out.push_str(&insertion.apply(tag_text, &attribute_text, &value));

        tracing::trace!(tag = %tag.name, %value, "assigned identity");
        tag.set_identity(value);
    }

    out.push_str(&template[cursor..]);
    out
}
