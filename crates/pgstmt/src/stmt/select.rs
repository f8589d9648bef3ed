//! SELECT statement builder, plus the JOIN and ORDER BY pieces shared with
//! UPDATE and set operations.

use crate::stmt::build::{BuiltQuery, compile};
use crate::stmt::cond::Cond;
use crate::stmt::group::{Group, ParenGroup, paren};
use crate::stmt::term::{IntoTerms, Literal, Term};
use crate::stmt::union::UnionStatement;

/// SELECT statement builder.
///
/// Clauses are emitted in SQL grammar order regardless of call order:
/// `select [distinct [on (...)]] <columns> [from ... [joins]] [where] [group by]
/// [having] [order by] [limit] [offset]`.
#[derive(Clone, Debug, Default)]
pub struct SelectStatement {
    distinct: Option<Distinct>,
    columns: Group,
    from: Group,
    joins: Vec<Join>,
    filter: Cond,
    group_by: Group,
    having: Cond,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sub-select and return its rendered terms.
    pub(crate) fn nested(f: impl FnOnce(&mut SelectStatement)) -> Term {
        let mut st = SelectStatement::new();
        f(&mut st);
        Term::Nested(st.into_terms())
    }

    // ==================== Columns ====================

    /// `select distinct`; call [`Distinct::on`] for `distinct on (...)`.
    pub fn distinct(&mut self) -> &mut Distinct {
        self.distinct.get_or_insert_with(Distinct::default)
    }

    /// Append output columns. Values render verbatim unless wrapped with `arg`.
    pub fn columns(&mut self, cols: impl IntoTerms) {
        self.columns.extend(cols);
    }

    /// Append `(select ...) alias` as an output column.
    pub fn column_select(&mut self, f: impl FnOnce(&mut SelectStatement), alias: &str) {
        self.columns.push(aliased(SelectStatement::nested(f), alias));
    }

    // ==================== FROM ====================

    pub fn from(&mut self, tables: impl IntoTerms) {
        self.from.extend(tables);
    }

    /// `from (select ...) alias`
    pub fn from_select(&mut self, f: impl FnOnce(&mut SelectStatement), alias: &str) {
        self.from.push(aliased(SelectStatement::nested(f), alias));
    }

    /// `from (values (...), (...)) alias`
    pub fn from_values(&mut self, f: impl FnOnce(&mut Values), alias: &str) {
        let mut values = Values::default();
        f(&mut values);
        self.from.push(aliased(values.into_term(), alias));
    }

    // ==================== JOIN ====================

    pub fn join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(Join::table(JoinKind::Join, table.into()))
    }

    pub fn inner_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(Join::table(JoinKind::Inner, table.into()))
    }

    pub fn full_outer_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(Join::table(JoinKind::FullOuter, table.into()))
    }

    pub fn left_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(Join::table(JoinKind::Left, table.into()))
    }

    pub fn right_join(&mut self, table: impl Into<Term>) -> &mut Join {
        self.push_join(Join::table(JoinKind::Right, table.into()))
    }

    /// `<kind> (select ...) alias`
    pub fn join_select(
        &mut self,
        kind: JoinKind,
        f: impl FnOnce(&mut SelectStatement),
        alias: &str,
    ) -> &mut Join {
        let target = aliased(SelectStatement::nested(f), alias);
        self.push_join(Join::table(kind, target))
    }

    /// `<kind> lateral (select ...) alias`
    pub fn join_lateral_select(
        &mut self,
        kind: JoinKind,
        f: impl FnOnce(&mut SelectStatement),
        alias: &str,
    ) -> &mut Join {
        let target = aliased(SelectStatement::nested(f), alias);
        self.push_join(Join::lateral(kind, target))
    }

    /// `<kind> ((select ...) union (select ...)) alias`
    pub fn join_union(
        &mut self,
        kind: JoinKind,
        f: impl FnOnce(&mut UnionStatement),
        alias: &str,
    ) -> &mut Join {
        let target = aliased(UnionStatement::nested(f), alias);
        self.push_join(Join::table(kind, target))
    }

    fn push_join(&mut self, join: Join) -> &mut Join {
        self.joins.push(join);
        let last = self.joins.len() - 1;
        &mut self.joins[last]
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    /// Add predicates to the WHERE clause.
    pub fn filter(&mut self, f: impl FnOnce(&mut Cond)) {
        f(&mut self.filter);
    }

    /// `group by (cols...)`
    pub fn group_by(&mut self, cols: impl IntoTerms) {
        self.group_by.extend(cols);
    }

    pub fn having(&mut self, f: impl FnOnce(&mut Cond)) {
        f(&mut self.having);
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    pub fn order_by(&mut self, col: impl Into<Term>) -> &mut OrderBy {
        push_order(&mut self.order_by, col.into())
    }

    pub fn limit(&mut self, n: i64) {
        self.limit = Some(n);
    }

    pub fn offset(&mut self, n: i64) {
        self.offset = Some(n);
    }

    // ==================== Build ====================

    pub fn build(self) -> BuiltQuery {
        compile(&self.into_terms())
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        let mut b = vec![Term::from("select")];
        if let Some(distinct) = self.distinct {
            b.push("distinct".into());
            if !distinct.on.is_empty() {
                b.push("on".into());
                b.push(ParenGroup::of(", ", distinct.on.into_terms()).into());
            }
        }
        if !self.columns.is_empty() {
            b.push(self.columns.into());
        }
        if !self.from.is_empty() {
            b.push("from".into());
            b.push(self.from.into());
            for join in self.joins {
                b.push(join.into_term());
            }
        }
        if !self.filter.is_empty() {
            b.push("where".into());
            b.push(self.filter.into_term());
        }
        if !self.group_by.is_empty() {
            b.push("group by".into());
            b.push(ParenGroup::of(", ", self.group_by.into_terms()).into());
        }
        if !self.having.is_empty() {
            b.push("having".into());
            b.push(self.having.into_term());
        }
        push_order_limit(&mut b, self.order_by, self.limit, self.offset);
        b
    }
}

/// `(inner) alias`, or `(inner)` for an empty alias.
pub(crate) fn aliased(inner: Term, alias: &str) -> Term {
    let mut terms = vec![paren(inner)];
    if !alias.is_empty() {
        terms.push(alias.into());
    }
    Term::Nested(terms)
}

pub(crate) fn push_order(order: &mut Vec<OrderBy>, col: Term) -> &mut OrderBy {
    order.push(OrderBy::new(col));
    let last = order.len() - 1;
    &mut order[last]
}

/// Append the trailing `order by`/`limit`/`offset` clauses.
pub(crate) fn push_order_limit(
    b: &mut Vec<Term>,
    order: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
) {
    if !order.is_empty() {
        b.push("order by".into());
        b.push(Group::of(", ", order.into_iter().map(OrderBy::into_term).collect()).into());
    }
    if let Some(n) = limit {
        b.push("limit".into());
        b.push(Literal::Int8(n).into());
    }
    if let Some(n) = offset {
        b.push("offset".into());
        b.push(Literal::Int8(n).into());
    }
}

/// `distinct [on (...)]`
#[derive(Clone, Debug, Default)]
pub struct Distinct {
    on: Group,
}

impl Distinct {
    pub fn on(&mut self, cols: impl IntoTerms) -> &mut Self {
        self.on.extend(cols);
        self
    }
}

/// Literal rows for `from (values ...)`.
#[derive(Clone, Debug, Default)]
pub struct Values {
    rows: Group,
}

impl Values {
    /// Append one row; every value is bound.
    pub fn value(&mut self, row: impl IntoTerms) {
        let row: Vec<Term> = row.into_terms().into_iter().map(Term::arg).collect();
        self.rows.push(ParenGroup::of(", ", row));
    }

    fn into_term(self) -> Term {
        Term::Nested(vec!["values".into(), self.rows.into()])
    }
}

/// Join flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Join,
    Inner,
    FullOuter,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Join => "join",
            JoinKind::Inner => "inner join",
            JoinKind::FullOuter => "full outer join",
            JoinKind::Left => "left join",
            JoinKind::Right => "right join",
        }
    }
}

/// A JOIN clause; attach `on (...)` or `using (...)`.
#[derive(Clone, Debug)]
pub struct Join {
    kind: JoinKind,
    lateral: bool,
    target: Term,
    on: Cond,
    using: Group,
}

impl Join {
    pub(crate) fn table(kind: JoinKind, target: Term) -> Self {
        Self {
            kind,
            lateral: false,
            target,
            on: Cond::new(),
            using: Group::new(),
        }
    }

    pub(crate) fn lateral(kind: JoinKind, target: Term) -> Self {
        Self {
            lateral: true,
            ..Self::table(kind, target)
        }
    }

    pub fn on(&mut self, f: impl FnOnce(&mut Cond)) -> &mut Self {
        f(&mut self.on);
        self
    }

    pub fn using(&mut self, cols: impl IntoTerms) -> &mut Self {
        self.using.extend(cols);
        self
    }

    pub(crate) fn into_term(self) -> Term {
        let mut b = vec![Term::from(self.kind.as_str())];
        if self.lateral {
            b.push("lateral".into());
        }
        b.push(self.target);
        if !self.on.is_empty() {
            b.push("on".into());
            b.push(self.on.into_term());
        }
        if !self.using.is_empty() {
            b.push("using".into());
            b.push(ParenGroup::of(", ", self.using.into_terms()).into());
        }
        Term::Nested(b)
    }
}

/// One ORDER BY item.
#[derive(Clone, Debug)]
pub struct OrderBy {
    col: Term,
    direction: Option<&'static str>,
    nulls: Option<&'static str>,
}

impl OrderBy {
    fn new(col: Term) -> Self {
        Self {
            col,
            direction: None,
            nulls: None,
        }
    }

    pub fn asc(&mut self) -> &mut Self {
        self.direction = Some("asc");
        self
    }

    pub fn desc(&mut self) -> &mut Self {
        self.direction = Some("desc");
        self
    }

    pub fn nulls_first(&mut self) -> &mut Self {
        self.nulls = Some("nulls first");
        self
    }

    pub fn nulls_last(&mut self) -> &mut Self {
        self.nulls = Some("nulls last");
        self
    }

    fn into_term(self) -> Term {
        let mut b = vec![self.col];
        if let Some(d) = self.direction {
            b.push(d.into());
        }
        if let Some(n) = self.nulls {
            b.push(n.into());
        }
        Term::Nested(b)
    }
}
