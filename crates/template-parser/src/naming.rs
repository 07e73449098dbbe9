//! Identifier normalization for variable names.

/// Operators spelled out in generated names, in replacement order.
const OPERATOR_WORDS: [(char, &str); 5] = [
    ('+', "_plus_"),
    ('-', "_minus_"),
    ('*', "_multiply_"),
    ('/', "_divide_"),
    ('.', "_dot_"),
];

/// Derives an identifier from an interpolation expression.
///
/// Arithmetic operators and `.` are spelled out, then every remaining character
/// that cannot appear in an identifier becomes `_`.
pub fn identifier(expression: &str) -> String {
    sanitize(&spell_operators(expression.trim()))
}

/// Replaces `+ - * / .` with readable words.
pub fn spell_operators(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    for ch in expression.chars() {
        match OPERATOR_WORDS.iter().find(|(op, _)| *op == ch) {
            Some((_, word)) => out.push_str(word),
            None => out.push(ch),
        }
    }
    out
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`. A leading digit is
/// replaced too.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .enumerate()
        .map(|(idx, ch)| {
            let allowed = ch.is_ascii_alphabetic()
                || ch == '_'
                || (idx > 0 && ch.is_ascii_digit());
            if allowed {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Name for an interactive tag that holds no variable.
///
/// Uses the tag's `name` and `id` attributes when present, and falls back to its
/// text content only when neither exists.
pub fn interactive_tag_name(
    tag: &str,
    name_attr: Option<&str>,
    id_attr: Option<&str>,
    text: &str,
) -> String {
    let mut name = tag.to_string();
    for part in [name_attr, id_attr].into_iter().flatten() {
        if !part.is_empty() {
            name.push('_');
            name.push_str(part);
        }
    }
    let text = text.trim();
    if name.len() == tag.len() && !text.is_empty() {
        name.push('_');
        name.push_str(text);
    }
    sanitize(&name)
}
