//! UPDATE statement builder.

use crate::stmt::build::{BuiltQuery, compile};
use crate::stmt::cond::Cond;
use crate::stmt::group::{Group, ParenGroup, paren};
use crate::stmt::select::{Join, JoinKind, SelectStatement};
use crate::stmt::term::{IntoTerms, Term};

/// UPDATE statement builder.
///
/// Also used for the `do update` action of `insert ... on conflict`, where the
/// table is left unset.
#[derive(Clone, Debug, Default)]
pub struct UpdateStatement {
    table: Option<Term>,
    sets: Vec<Set>,
    from: Group,
    joins: Vec<Join>,
    filter: Cond,
    current_of: Option<Term>,
    returning: Group,
}

impl UpdateStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&mut self, table: impl Into<Term>) {
        self.table = Some(table.into());
    }

    /// Start a SET entry for one or more columns.
    ///
    /// Several columns render as `(a, b) = row($1, $2)`, or `(a, b) = (select ...)`
    /// when assigned from a sub-select.
    pub fn set(&mut self, cols: impl IntoTerms) -> &mut Set {
        self.sets.push(Set::new(cols.into_terms()));
        let last = self.sets.len() - 1;
        &mut self.sets[last]
    }

    pub fn from(&mut self, tables: impl IntoTerms) {
        self.from.extend(tables);
    }

    // ==================== JOIN ====================

    pub fn join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(JoinKind::Join, table.into())
    }

    pub fn inner_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(JoinKind::Inner, table.into())
    }

    pub fn full_outer_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(JoinKind::FullOuter, table.into())
    }

    pub fn left_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(JoinKind::Left, table.into())
    }

    pub fn right_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(JoinKind::Right, table.into())
    }

    fn push_join(&mut self, kind: JoinKind, table: Term) -> &mut Join {
        self.joins.push(Join::table(kind, table));
        let last = self.joins.len() - 1;
        &mut self.joins[last]
    }

    // ==================== WHERE / RETURNING ====================

    pub fn filter(&mut self, f: impl FnOnce(&mut Cond)) {
        f(&mut self.filter);
    }

    /// `where current of <cursor>`
    pub fn where_current_of(&mut self, cursor: impl Into<Term>) {
        self.current_of = Some(cursor.into());
    }

    pub fn returning(&mut self, cols: impl IntoTerms) {
        self.returning.extend(cols);
    }

    pub fn build(self) -> BuiltQuery {
        compile(&self.into_terms())
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        let mut b = vec![Term::from("update")];
        if let Some(table) = self.table {
            b.push(table);
        }
        if !self.sets.is_empty() {
            b.push("set".into());
            let sets = self.sets.into_iter().map(Set::into_term).collect();
            b.push(Group::of(", ", sets).into());
        }
        if !self.from.is_empty() {
            b.push("from".into());
            b.push(self.from.into());
        }
        for join in self.joins {
            b.push(join.into_term());
        }
        if !self.filter.is_empty() {
            b.push("where".into());
            b.push(self.filter.into_term());
        }
        if let Some(cursor) = self.current_of {
            b.push("where current of".into());
            b.push(cursor);
        }
        if !self.returning.is_empty() {
            b.push("returning".into());
            b.push(self.returning.into());
        }
        b
    }
}

/// One SET entry.
#[derive(Clone, Debug)]
pub struct Set {
    cols: Vec<Term>,
    to: Vec<Term>,
}

impl Set {
    fn new(cols: Vec<Term>) -> Self {
        Self {
            cols,
            to: Vec::new(),
        }
    }

    /// Bound values.
    pub fn to(&mut self, values: impl IntoTerms) -> &mut Self {
        self.to
            .extend(values.into_terms().into_iter().map(Term::arg));
        self
    }

    /// Raw SQL values.
    pub fn to_raw(&mut self, values: impl IntoTerms) -> &mut Self {
        self.to
            .extend(values.into_terms().into_iter().map(Term::raw));
        self
    }

    /// Values from a sub-select.
    pub fn select(&mut self, f: impl FnOnce(&mut SelectStatement)) -> &mut Self {
        self.to.push(paren(SelectStatement::nested(f)));
        self
    }

    fn into_term(self) -> Term {
        let target: Term = if self.cols.len() > 1 {
            ParenGroup::of(", ", self.cols).into()
        } else {
            Group::of(", ", self.cols).into()
        };
        let value: Term = if self.to.len() > 1 {
            let mut row = ParenGroup::with_prefix("row");
            row.extend(self.to);
            row.into()
        } else {
            Group::of(", ", self.to).into()
        };
        Term::Nested(vec![target, "=".into(), value])
    }
}
