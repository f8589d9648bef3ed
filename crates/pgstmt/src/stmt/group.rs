//! Ordered term sequences: the structural backbone of every clause.

use crate::stmt::term::{IntoTerms, Term};

const DEFAULT_SEP: &str = ", ";

/// Terms joined by a separator (`", "` unless configured).
#[derive(Clone, Debug)]
pub struct Group {
    terms: Vec<Term>,
    sep: &'static str,
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Group {
    pub fn new() -> Self {
        Self::with_sep(DEFAULT_SEP)
    }

    pub fn with_sep(sep: &'static str) -> Self {
        Self {
            terms: Vec::new(),
            sep,
        }
    }

    /// Build a group from existing terms.
    pub fn of(sep: &'static str, terms: Vec<Term>) -> Self {
        Self { terms, sep }
    }

    /// Append one term.
    pub fn push(&mut self, term: impl Into<Term>) {
        self.terms.push(term.into());
    }

    /// Append every term of `terms`, in order.
    pub fn extend(&mut self, terms: impl IntoTerms) {
        self.terms.extend(terms.into_terms());
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn sep(&self) -> &'static str {
        self.sep
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        self.terms
    }
}

/// A [`Group`] rendered inside parentheses, optionally prefixed (`row(...)`).
#[derive(Clone, Debug, Default)]
pub struct ParenGroup {
    group: Group,
    prefix: &'static str,
}

impl ParenGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sep(sep: &'static str) -> Self {
        Self {
            group: Group::with_sep(sep),
            prefix: "",
        }
    }

    /// A parenthesized group rendered as `prefix(...)`.
    pub fn with_prefix(prefix: &'static str) -> Self {
        Self {
            group: Group::new(),
            prefix,
        }
    }

    /// Build a parenthesized group from existing terms.
    pub fn of(sep: &'static str, terms: Vec<Term>) -> Self {
        Self {
            group: Group::of(sep, terms),
            prefix: "",
        }
    }

    pub fn push(&mut self, term: impl Into<Term>) {
        self.group.push(term);
    }

    pub fn extend(&mut self, terms: impl IntoTerms) {
        self.group.extend(terms);
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    pub fn len(&self) -> usize {
        self.group.len()
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn group(&self) -> &Group {
        &self.group
    }
}

/// Parenthesize a single term: `(term)`.
pub(crate) fn paren(term: impl Into<Term>) -> Term {
    Term::Paren(ParenGroup::of(DEFAULT_SEP, vec![term.into()]))
}
