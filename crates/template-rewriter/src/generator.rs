//! Unique identity values.

/// Prefix used for generated values unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "__pogen_";

/// Hands out `prefix0`, `prefix1`, ... for one rewrite session.
///
/// Share one generator across every template of a session so values stay
/// unique across files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueGenerator {
    prefix: String,
    next: usize,
}

impl ValueGenerator {
    /// Creates a generator starting at zero.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 0)
    }

    /// Creates a generator whose first value uses `next`.
    pub fn starting_at(prefix: impl Into<String>, next: usize) -> Self {
        Self {
            prefix: prefix.into(),
            next,
        }
    }

    /// The prefix of every generated value.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of values issued so far, including the starting offset.
    pub fn issued(&self) -> usize {
        self.next
    }

    /// Returns a fresh value.
    pub fn next_value(&mut self) -> String {
        let value = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        value
    }
}

impl Default for ValueGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
