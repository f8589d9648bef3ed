//! Set operations: `(select ...) union [all] (select ...)`.

use crate::stmt::build::{BuiltQuery, compile};
use crate::stmt::group::paren;
use crate::stmt::select::{OrderBy, SelectStatement, push_order, push_order_limit};
use crate::stmt::term::Term;

/// UNION builder. Every part is parenthesized; the trailing ORDER BY, LIMIT
/// and OFFSET apply to the combined result.
#[derive(Clone, Debug, Default)]
pub struct UnionStatement {
    parts: Vec<Term>,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl UnionStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn nested(f: impl FnOnce(&mut UnionStatement)) -> Term {
        let mut st = UnionStatement::new();
        f(&mut st);
        Term::Nested(st.into_terms())
    }

    /// `union (select ...)`; the first part has no keyword.
    pub fn select(&mut self, f: impl FnOnce(&mut SelectStatement)) {
        self.push_part("union", SelectStatement::nested(f));
    }

    /// `union all (select ...)`
    pub fn all_select(&mut self, f: impl FnOnce(&mut SelectStatement)) {
        self.push_part("union all", SelectStatement::nested(f));
    }

    /// `union (<nested union>)`
    pub fn union(&mut self, f: impl FnOnce(&mut UnionStatement)) {
        self.push_part("union", UnionStatement::nested(f));
    }

    /// `union all (<nested union>)`
    pub fn all_union(&mut self, f: impl FnOnce(&mut UnionStatement)) {
        self.push_part("union all", UnionStatement::nested(f));
    }

    fn push_part(&mut self, keyword: &'static str, part: Term) {
        if !self.parts.is_empty() {
            self.parts.push(keyword.into());
        }
        self.parts.push(paren(part));
    }

    pub fn order_by(&mut self, col: impl Into<Term>) -> &mut OrderBy {
        push_order(&mut self.order_by, col.into())
    }

    pub fn limit(&mut self, n: i64) {
        self.limit = Some(n);
    }

    pub fn offset(&mut self, n: i64) {
        self.offset = Some(n);
    }

    pub fn build(self) -> BuiltQuery {
        compile(&self.into_terms())
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        let mut b = self.parts;
        push_order_limit(&mut b, self.order_by, self.limit, self.offset);
        b
    }
}
