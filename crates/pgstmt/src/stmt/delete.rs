//! DELETE statement builder.

use crate::stmt::build::{BuiltQuery, compile};
use crate::stmt::cond::Cond;
use crate::stmt::group::Group;
use crate::stmt::term::{IntoTerms, Term};

#[derive(Clone, Debug, Default)]
pub struct DeleteStatement {
    from: Option<Term>,
    filter: Cond,
    returning: Group,
}

impl DeleteStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(&mut self, table: impl Into<Term>) {
        self.from = Some(table.into());
    }

    pub fn filter(&mut self, f: impl FnOnce(&mut Cond)) {
        f(&mut self.filter);
    }

    pub fn returning(&mut self, cols: impl IntoTerms) {
        self.returning.extend(cols);
    }

    pub fn build(self) -> BuiltQuery {
        compile(&self.into_terms())
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        let mut b = vec![Term::from("delete from")];
        if let Some(table) = self.from {
            b.push(table);
        }
        if !self.filter.is_empty() {
            b.push("where".into());
            b.push(self.filter.into_term());
        }
        if !self.returning.is_empty() {
            b.push("returning".into());
            b.push(self.returning.into());
        }
        b
    }
}
