//! Boolean condition builder used by WHERE, HAVING, JOIN ... ON and
//! ON CONFLICT ... WHERE.
//!
//! A [`Cond`] holds a *local clause* (atomic predicates joined by one operator,
//! `and` unless [`CondMode::or`] was called) and a *chain* of nested conditions
//! appended by [`Cond::and`] / [`Cond::or`]. Rendering:
//!
//! - local clause present: `(p1 and p2)` followed by each chained entry as
//!   `and <nested>` / `or <nested>`; the whole sequence is parenthesized once
//!   more when the condition is itself nested and has a chain;
//! - no local clause, one chained entry: the entry renders as if it were the
//!   condition itself;
//! - no local clause, several chained entries: joined by their keywords and
//!   parenthesized when nested.

use crate::stmt::group::{Group, ParenGroup, paren};
use crate::stmt::select::SelectStatement;
use crate::stmt::term::{IntoTerms, Term};

/// Condition builder.
#[derive(Clone, Debug, Default)]
pub struct Cond {
    ops: Vec<Term>,
    or_mode: bool,
    chain: Vec<(&'static str, Cond)>,
    nested: bool,
}

impl Cond {
    pub fn new() -> Self {
        Self::default()
    }

    fn nested() -> Self {
        Self {
            nested: true,
            ..Self::default()
        }
    }

    /// Whether no predicate has been added.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.chain.is_empty()
    }

    fn push_predicate(&mut self, terms: Vec<Term>) {
        self.ops.push(Term::Group(Group::of(" ", terms)));
    }

    // ==================== Comparison ====================

    /// `field <op> $n`
    pub fn op(&mut self, field: impl Into<Term>, op: &str, value: impl Into<Term>) {
        self.push_predicate(vec![field.into(), op.into(), value.into().arg()]);
    }

    /// `field <op> value`, with `value` rendered as SQL.
    pub fn op_raw(&mut self, field: impl Into<Term>, op: &str, value: impl Into<Term>) {
        self.push_predicate(vec![field.into(), op.into(), value.into().raw()]);
    }

    pub fn eq(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, "=", value);
    }

    pub fn eq_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, "=", value);
    }

    pub fn ne(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, "!=", value);
    }

    pub fn ne_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, "!=", value);
    }

    pub fn lt(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, "<", value);
    }

    pub fn lt_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, "<", value);
    }

    pub fn le(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, "<=", value);
    }

    pub fn le_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, "<=", value);
    }

    pub fn gt(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, ">", value);
    }

    pub fn gt_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, ">", value);
    }

    pub fn ge(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, ">=", value);
    }

    pub fn ge_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, ">=", value);
    }

    pub fn like(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, "like", value);
    }

    pub fn like_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, "like", value);
    }

    pub fn ilike(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op(field, "ilike", value);
    }

    pub fn ilike_raw(&mut self, field: impl Into<Term>, value: impl Into<Term>) {
        self.op_raw(field, "ilike", value);
    }

    /// `field between $n and $m`
    pub fn between(
        &mut self,
        field: impl Into<Term>,
        low: impl Into<Term>,
        high: impl Into<Term>,
    ) {
        self.push_predicate(vec![
            field.into(),
            "between".into(),
            low.into().arg(),
            "and".into(),
            high.into().arg(),
        ]);
    }

    /// `field not between $n and $m`
    pub fn not_between(
        &mut self,
        field: impl Into<Term>,
        low: impl Into<Term>,
        high: impl Into<Term>,
    ) {
        self.push_predicate(vec![
            field.into(),
            "not between".into(),
            low.into().arg(),
            "and".into(),
            high.into().arg(),
        ]);
    }

    // ==================== Membership ====================

    /// `field in ($1, $2, ...)`; an empty list renders `false`.
    pub fn in_list(&mut self, field: impl Into<Term>, values: impl IntoTerms) {
        self.membership(field.into(), "in", args(values));
    }

    /// `field in (v1, v2, ...)` with values rendered as SQL.
    pub fn in_raw(&mut self, field: impl Into<Term>, values: impl IntoTerms) {
        self.membership(field.into(), "in", raws(values));
    }

    /// `field in (select ...)`
    pub fn in_select(&mut self, field: impl Into<Term>, f: impl FnOnce(&mut SelectStatement)) {
        let sub = SelectStatement::nested(f);
        self.push_predicate(vec![field.into(), "in".into(), paren(sub)]);
    }

    /// `field not in ($1, $2, ...)`; an empty list renders `true`.
    pub fn not_in(&mut self, field: impl Into<Term>, values: impl IntoTerms) {
        self.membership(field.into(), "not in", args(values));
    }

    pub fn not_in_raw(&mut self, field: impl Into<Term>, values: impl IntoTerms) {
        self.membership(field.into(), "not in", raws(values));
    }

    /// `field op (values...)`. An empty list has no valid SQL form: `in`
    /// becomes `false`, `not in` becomes `true`, other operators are dropped.
    fn membership(&mut self, field: Term, op: &str, values: Vec<Term>) {
        if values.is_empty() {
            match op {
                "in" => self.ops.push("false".into()),
                "not in" => self.ops.push("true".into()),
                _ => {}
            }
            return;
        }
        self.push_predicate(vec![field, op.into(), ParenGroup::of(", ", values).into()]);
    }

    // ==================== Null checks ====================

    pub fn is_null(&mut self, field: impl Into<Term>) {
        self.push_predicate(vec![field.into(), "is null".into()]);
    }

    pub fn is_not_null(&mut self, field: impl Into<Term>) {
        self.push_predicate(vec![field.into(), "is not null".into()]);
    }

    // ==================== Fluent predicates ====================

    /// Start a predicate whose left side is a field (rendered as SQL).
    pub fn field(&mut self, field: impl Into<Term>) -> CondOp<'_> {
        CondOp {
            cond: self,
            left: field.into(),
        }
    }

    /// Start a predicate whose left side is a bound value.
    pub fn value(&mut self, value: impl Into<Term>) -> CondOp<'_> {
        CondOp {
            cond: self,
            left: value.into().arg(),
        }
    }

    /// Append a raw SQL predicate.
    pub fn raw(&mut self, sql: impl Into<String>) {
        let sql: String = sql.into();
        self.ops.push(Term::from(sql));
    }

    // ==================== Combinators ====================

    /// Add `(not <nested>)` to the local clause.
    pub fn not(&mut self, f: impl FnOnce(&mut Cond)) {
        let mut x = Cond::nested();
        f(&mut x);
        if !x.is_empty() {
            self.ops.push(ParenGroup::of(" ", vec!["not".into(), x.into_term()]).into());
        }
    }

    /// Chain `and <nested>`.
    pub fn and(&mut self, f: impl FnOnce(&mut Cond)) {
        self.chain_with("and", f);
    }

    /// Chain `or <nested>`.
    pub fn or(&mut self, f: impl FnOnce(&mut Cond)) {
        self.chain_with("or", f);
    }

    fn chain_with(&mut self, keyword: &'static str, f: impl FnOnce(&mut Cond)) {
        let mut x = Cond::nested();
        f(&mut x);
        if !x.is_empty() {
            self.chain.push((keyword, x));
        }
    }

    /// Select the operator joining the local clause.
    pub fn mode(&mut self) -> CondMode<'_> {
        CondMode { cond: self }
    }

    // ==================== Rendering ====================

    pub(crate) fn into_term(self) -> Term {
        Term::Nested(self.into_terms())
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        let Cond {
            ops,
            or_mode,
            chain,
            nested,
        } = self;

        if ops.is_empty() && chain.is_empty() {
            return Vec::new();
        }

        if ops.is_empty() {
            if chain.len() == 1 {
                return chain.into_iter().flat_map(|(_, c)| c.into_terms()).collect();
            }
            let mut seq = Vec::with_capacity(chain.len() * 2);
            for (i, (keyword, c)) in chain.into_iter().enumerate() {
                if i > 0 {
                    seq.push(keyword.into());
                }
                seq.push(c.into_term());
            }
            return wrap_if(nested, seq);
        }

        let sep = if or_mode { " or " } else { " and " };
        let has_chain = !chain.is_empty();
        let mut seq = vec![Term::Paren(ParenGroup::of(sep, ops))];
        for (keyword, c) in chain {
            seq.push(keyword.into());
            seq.push(c.into_term());
        }
        wrap_if(nested && has_chain, seq)
    }
}

fn wrap_if(wrap: bool, seq: Vec<Term>) -> Vec<Term> {
    if wrap {
        vec![ParenGroup::of(" ", seq).into()]
    } else {
        seq
    }
}

fn args(values: impl IntoTerms) -> Vec<Term> {
    values.into_terms().into_iter().map(Term::arg).collect()
}

fn raws(values: impl IntoTerms) -> Vec<Term> {
    values.into_terms().into_iter().map(Term::raw).collect()
}

/// Operator switch for the local clause of a [`Cond`].
pub struct CondMode<'a> {
    cond: &'a mut Cond,
}

impl CondMode<'_> {
    /// Join local predicates with `and` (the default).
    pub fn and(self) {
        self.cond.or_mode = false;
    }

    /// Join local predicates with `or`.
    pub fn or(self) {
        self.cond.or_mode = true;
    }
}

/// Left side of a fluent predicate; pick the operator next.
///
/// Nothing is added to the condition until the right side is supplied (or a
/// null check is chosen).
pub struct CondOp<'a> {
    cond: &'a mut Cond,
    left: Term,
}

impl<'a> CondOp<'a> {
    pub fn op(self, op: &str) -> CondValue<'a> {
        CondValue {
            cond: self.cond,
            left: self.left,
            op: op.into(),
        }
    }

    pub fn op_values(self, op: &str) -> CondValues<'a> {
        CondValues {
            cond: self.cond,
            left: self.left,
            op: op.to_string(),
        }
    }

    pub fn eq(self) -> CondValue<'a> {
        self.op("=")
    }

    pub fn ne(self) -> CondValue<'a> {
        self.op("!=")
    }

    pub fn lt(self) -> CondValue<'a> {
        self.op("<")
    }

    pub fn le(self) -> CondValue<'a> {
        self.op("<=")
    }

    pub fn gt(self) -> CondValue<'a> {
        self.op(">")
    }

    pub fn ge(self) -> CondValue<'a> {
        self.op(">=")
    }

    pub fn like(self) -> CondValue<'a> {
        self.op("like")
    }

    pub fn ilike(self) -> CondValue<'a> {
        self.op("ilike")
    }

    pub fn in_list(self) -> CondValues<'a> {
        self.op_values("in")
    }

    pub fn not_in(self) -> CondValues<'a> {
        self.op_values("not in")
    }

    pub fn is_null(self) {
        self.cond.push_predicate(vec![self.left, "is null".into()]);
    }

    pub fn is_not_null(self) {
        self.cond.push_predicate(vec![self.left, "is not null".into()]);
    }
}

/// Right side of a fluent single-value predicate.
pub struct CondValue<'a> {
    cond: &'a mut Cond,
    left: Term,
    op: Term,
}

impl CondValue<'_> {
    /// Bound value: `left op $n`.
    pub fn value(self, value: impl Into<Term>) {
        self.finish(value.into().arg());
    }

    /// Raw SQL value.
    pub fn raw(self, value: impl Into<Term>) {
        self.finish(value.into().raw());
    }

    /// Another field: `left op other_field`.
    pub fn field(self, field: impl Into<Term>) {
        self.finish(field.into().raw());
    }

    fn finish(self, right: Term) {
        self.cond.push_predicate(vec![self.left, self.op, right]);
    }
}

/// Right side of a fluent list predicate (`in`, `not in`, custom operators).
pub struct CondValues<'a> {
    cond: &'a mut Cond,
    left: Term,
    op: String,
}

impl CondValues<'_> {
    /// Bound values: `left op ($n, $m, ...)`.
    ///
    /// An empty list follows [`Cond::in_list`]: `false` for `in`, `true` for
    /// `not in`, nothing for other operators.
    pub fn value(self, values: impl IntoTerms) {
        self.cond.membership(self.left, &self.op, args(values));
    }

    /// Raw SQL values: `left op (a, b, ...)`.
    pub fn raw(self, values: impl IntoTerms) {
        self.cond.membership(self.left, &self.op, raws(values));
    }

    /// A field holding the set: `left op field`.
    pub fn field(self, field: impl Into<Term>) {
        self.finish(field.into().raw());
    }

    /// A sub-select: `left op (select ...)`.
    pub fn select(self, f: impl FnOnce(&mut SelectStatement)) {
        let sub = SelectStatement::nested(f);
        self.finish(paren(sub));
    }

    fn finish(self, right: Term) {
        self.cond.push_predicate(vec![self.left, self.op.into(), right]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::build::compile;

    fn render(f: impl FnOnce(&mut Cond)) -> (String, usize) {
        let mut c = Cond::new();
        f(&mut c);
        let q = compile(&c.into_terms());
        (q.sql, q.params.len())
    }

    #[test]
    fn test_empty_renders_nothing() {
        assert_eq!(render(|_| {}), (String::new(), 0));
        assert_eq!(render(|c| c.and(|_| {})), (String::new(), 0));
    }

    #[test]
    fn test_single_predicate_is_parenthesized() {
        assert_eq!(render(|c| c.eq("id", 1)), ("(id = $1)".to_string(), 1));
    }

    #[test]
    fn test_or_mode() {
        let (sql, _) = render(|c| {
            c.mode().or();
            c.eq_raw("a", 1);
            c.eq_raw("a", 2);
        });
        assert_eq!(sql, "(a = 1 or a = 2)");
    }

    #[test]
    fn test_chain_without_local_clause() {
        let (sql, _) = render(|c| {
            c.and(|c| c.eq_raw("a", 1));
            c.or(|c| c.eq_raw("b", 2));
        });
        assert_eq!(sql, "(a = 1) or (b = 2)");
    }

    #[test]
    fn test_not() {
        let (sql, n) = render(|c| c.not(|c| c.eq("x", 1)));
        assert_eq!(sql, "((not (x = $1)))");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_between() {
        let (sql, n) = render(|c| c.between("age", 18, 30));
        assert_eq!(sql, "(age between $1 and $2)");
        assert_eq!(n, 2);
        let (sql, _) = render(|c| c.not_between("age", 18, 30));
        assert_eq!(sql, "(age not between $1 and $2)");
    }

    #[test]
    fn test_empty_in_list() {
        assert_eq!(render(|c| c.in_list("x", Vec::<i32>::new())).0, "(false)");
        assert_eq!(render(|c| c.not_in("x", Vec::<i32>::new())).0, "(true)");
    }

    #[test]
    fn test_fluent_value_list() {
        let (sql, n) = render(|c| {
            c.field("status").op_values("not in").raw(("'a'", "'b'"));
            c.value(5).le().field("max_age");
        });
        assert_eq!(sql, "(status not in ('a', 'b') and $1 <= max_age)");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_fluent_empty_list() {
        let empty = Vec::<i32>::new;
        assert_eq!(
            render(|c| c.field("x").in_list().value(empty())),
            ("(false)".to_string(), 0)
        );
        assert_eq!(
            render(|c| c.field("x").not_in().raw(empty())),
            ("(true)".to_string(), 0)
        );
        assert_eq!(
            render(|c| c.field("x").op_values("= any").value(empty())),
            (String::new(), 0)
        );
        let (sql, n) = render(|c| {
            c.eq("y", 1);
            c.field("x").in_list().value(empty());
        });
        assert_eq!(sql, "(y = $1 and false)");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_incomplete_fluent_predicate_adds_nothing() {
        assert_eq!(
            render(|c| {
                let _ = c.field("x").eq();
            }),
            (String::new(), 0)
        );
    }
}
