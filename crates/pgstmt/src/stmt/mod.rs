//! Statement builders for PostgreSQL.
//!
//! Each entry point takes a configuration closure, lets it populate a fresh
//! builder and compiles the result into a [`BuiltQuery`]: query text with `$n`
//! placeholders plus the arguments in placeholder order.
//!
//! # Features
//!
//! - **Term model**: literals render verbatim, values passed to predicates and
//!   SET/VALUES are bound; `raw`, `not_arg`, `any`, `all` and `DEFAULT` adjust that
//! - **Nested conditions**: AND/OR/NOT groups with deterministic parenthesization
//! - **Sub-statements**: sub-selects in columns, FROM, JOIN, IN, UPDATE SET and
//!   INSERT, plus nested unions
//! - **Single-pass numbering**: placeholders are assigned while rendering, so they
//!   always match the argument order
//!
//! # Usage
//!
//! ```ignore
//! use pgstmt::stmt;
//!
//! let q = stmt::select(|b| {
//!     b.columns(("id", "name"));
//!     b.from("users");
//!     b.filter(|c| {
//!         c.eq("id", 3);
//!         c.eq("name", "test");
//!     });
//! });
//! assert_eq!(q.sql, "select id, name from users where (id = $1 and name = $2)");
//!
//! let users: Vec<User> = q.fetch_all(&client).await?;
//! ```

mod build;
mod cond;
mod delete;
mod group;
mod insert;
mod param;
mod select;
mod term;
mod union;
mod update;

pub use build::{BuiltQuery, compile};
pub use cond::{Cond, CondMode, CondOp, CondValue, CondValues};
pub use delete::DeleteStatement;
pub use group::{Group, ParenGroup};
pub use insert::{InsertStatement, OnConflict};
pub use param::{Param, ParamList};
pub use select::{Distinct, Join, JoinKind, OrderBy, SelectStatement, Values};
pub use term::{
    DEFAULT, IntoTerms, Literal, Term, all, any, arg, json, not_arg, param, quote_literal, raw,
};
pub use union::UnionStatement;
pub use update::{Set, UpdateStatement};

/// Build a SELECT statement.
pub fn select(f: impl FnOnce(&mut SelectStatement)) -> BuiltQuery {
    let mut st = SelectStatement::new();
    f(&mut st);
    st.build()
}

/// Build an INSERT statement.
pub fn insert(f: impl FnOnce(&mut InsertStatement)) -> BuiltQuery {
    let mut st = InsertStatement::new();
    f(&mut st);
    st.build()
}

/// Build an UPDATE statement.
pub fn update(f: impl FnOnce(&mut UpdateStatement)) -> BuiltQuery {
    let mut st = UpdateStatement::new();
    f(&mut st);
    st.build()
}

/// Build a DELETE statement.
pub fn delete(f: impl FnOnce(&mut DeleteStatement)) -> BuiltQuery {
    let mut st = DeleteStatement::new();
    f(&mut st);
    st.build()
}

/// Build a set operation over parenthesized selects.
pub fn union(f: impl FnOnce(&mut UnionStatement)) -> BuiltQuery {
    let mut st = UnionStatement::new();
    f(&mut st);
    st.build()
}
