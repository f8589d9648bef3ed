//! INSERT statement builder with the ON CONFLICT sub-grammar.

use crate::stmt::build::{BuiltQuery, compile};
use crate::stmt::cond::Cond;
use crate::stmt::group::{Group, ParenGroup};
use crate::stmt::select::SelectStatement;
use crate::stmt::term::{IntoTerms, Term};
use crate::stmt::update::UpdateStatement;

/// INSERT statement builder.
#[derive(Clone, Debug, Default)]
pub struct InsertStatement {
    table: Option<Term>,
    columns: Group,
    overriding: Option<&'static str>,
    default_values: bool,
    values: Group,
    select: Option<Term>,
    conflict: Option<OnConflict>,
    returning: Group,
}

impl InsertStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into(&mut self, table: impl Into<Term>) {
        self.table = Some(table.into());
    }

    pub fn columns(&mut self, cols: impl IntoTerms) {
        self.columns.extend(cols);
    }

    /// `overriding system value`
    pub fn overriding_system_value(&mut self) {
        self.overriding = Some("system");
    }

    /// `overriding user value`
    pub fn overriding_user_value(&mut self) {
        self.overriding = Some("user");
    }

    pub fn default_values(&mut self) {
        self.default_values = true;
    }

    /// Append one VALUES row; every value is bound unless wrapped with
    /// `raw`/`not_arg`/`DEFAULT`.
    pub fn value(&mut self, row: impl IntoTerms) {
        let row: Vec<Term> = row.into_terms().into_iter().map(Term::arg).collect();
        self.values.push(ParenGroup::of(", ", row));
    }

    /// Append several VALUES rows.
    pub fn values<R: IntoTerms>(&mut self, rows: impl IntoIterator<Item = R>) {
        for row in rows {
            self.value(row);
        }
    }

    /// `insert ... select ...`
    pub fn select(&mut self, f: impl FnOnce(&mut SelectStatement)) {
        self.select = Some(SelectStatement::nested(f));
    }

    /// `on conflict (targets...)`
    pub fn on_conflict(&mut self, targets: impl IntoTerms) -> &mut OnConflict {
        self.conflict.insert(OnConflict::new(ConflictTarget::Columns(
            targets.into_terms(),
        )))
    }

    /// `on conflict on constraint <name>`
    pub fn on_conflict_on_constraint(&mut self, name: impl Into<Term>) -> &mut OnConflict {
        self.conflict
            .insert(OnConflict::new(ConflictTarget::Constraint(name.into())))
    }

    pub fn returning(&mut self, cols: impl IntoTerms) {
        self.returning.extend(cols);
    }

    pub fn build(self) -> BuiltQuery {
        compile(&self.into_terms())
    }

    pub(crate) fn into_terms(self) -> Vec<Term> {
        let mut b = vec![Term::from("insert")];
        if let Some(table) = self.table {
            b.push("into".into());
            b.push(table);
        }
        if !self.columns.is_empty() {
            b.push(ParenGroup::of(", ", self.columns.into_terms()).into());
        }
        if let Some(kind) = self.overriding {
            b.push("overriding".into());
            b.push(kind.into());
            b.push("value".into());
        }
        if self.default_values {
            b.push("default values".into());
        }
        if !self.values.is_empty() {
            b.push("values".into());
            b.push(self.values.into());
        }
        if let Some(select) = self.select {
            b.push(select);
        }
        if let Some(conflict) = self.conflict {
            b.push(conflict.into_term());
        }
        if !self.returning.is_empty() {
            b.push("returning".into());
            b.push(self.returning.into());
        }
        b
    }
}

#[derive(Clone, Debug)]
enum ConflictTarget {
    Columns(Vec<Term>),
    Constraint(Term),
}

#[derive(Clone, Debug)]
enum ConflictAction {
    Nothing,
    Update(UpdateStatement),
}

/// The `on conflict` clause of an INSERT.
#[derive(Clone, Debug)]
pub struct OnConflict {
    target: ConflictTarget,
    filter: Cond,
    action: Option<ConflictAction>,
}

impl OnConflict {
    fn new(target: ConflictTarget) -> Self {
        Self {
            target,
            filter: Cond::new(),
            action: None,
        }
    }

    /// Partial index predicate: `on conflict (cols) where ...`.
    ///
    /// Only rendered for a column target.
    pub fn filter(&mut self, f: impl FnOnce(&mut Cond)) -> &mut Self {
        f(&mut self.filter);
        self
    }

    pub fn do_nothing(&mut self) {
        self.action = Some(ConflictAction::Nothing);
    }

    /// `do update set ...`; the table is implied by the insert.
    pub fn do_update(&mut self, f: impl FnOnce(&mut UpdateStatement)) {
        let mut st = UpdateStatement::new();
        f(&mut st);
        self.action = Some(ConflictAction::Update(st));
    }

    fn into_term(self) -> Term {
        let mut b = vec![Term::from("on conflict")];
        match self.target {
            ConflictTarget::Columns(cols) => {
                if !cols.is_empty() {
                    b.push(ParenGroup::of(", ", cols).into());
                }
                if !self.filter.is_empty() {
                    b.push("where".into());
                    b.push(self.filter.into_term());
                }
            }
            ConflictTarget::Constraint(name) => {
                b.push("on constraint".into());
                b.push(name);
            }
        }
        match self.action {
            Some(ConflictAction::Nothing) => b.push("do nothing".into()),
            Some(ConflictAction::Update(st)) => {
                b.push("do".into());
                b.push(Term::Nested(st.into_terms()));
            }
            None => {}
        }
        Term::Nested(b)
    }
}
