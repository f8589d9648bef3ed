//! The term model: every value fed into a statement builder becomes a [`Term`].
//!
//! Classification rules:
//! - plain Rust scalars and strings are [`Term::Literal`]s and render verbatim
//!   (column names, expressions, numbers in `LIMIT`);
//! - clause methods that take *values* (`eq`, `value`, `to`, ...) classify their
//!   input with [`Term::arg`], turning literals into bound arguments;
//! - [`raw`] / [`not_arg`] keep a value out of the argument list;
//! - [`any`] / [`all`] wrap a value as `any(...)` / `all(...)`;
//! - [`DEFAULT`] renders the `default` keyword and never binds.
//!
//! Wrapping is idempotent: an already classified term is never wrapped twice.

use crate::stmt::group::{Group, ParenGroup};
use crate::stmt::param::Param;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio_postgres::types::ToSql;

/// A scalar with a fixed textual form.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    /// Rendered verbatim: identifiers, keywords and SQL expressions.
    Text(String),
    /// Rendered as a quoted timestamp literal.
    Timestamp(DateTime<Utc>),
    /// Rendered as a quoted date literal.
    Date(NaiveDate),
}

impl Literal {
    /// Textual form of the literal as it appears in query text.
    pub fn render(&self) -> String {
        match self {
            Literal::Null => "null".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int2(n) => n.to_string(),
            Literal::Int4(n) => n.to_string(),
            Literal::Int8(n) => n.to_string(),
            Literal::Float4(n) => n.to_string(),
            Literal::Float8(n) => n.to_string(),
            Literal::Text(s) => s.clone(),
            Literal::Timestamp(ts) => {
                quote_literal(&ts.format("%Y-%m-%d %H:%M:%S%.fZ").to_string())
            }
            Literal::Date(d) => quote_literal(&d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Convert into a bound value, keeping the Postgres width of the scalar.
    ///
    /// `Null` has no type and cannot be bound; it returns `None`.
    pub fn to_param(&self) -> Option<Param> {
        let param = match self {
            Literal::Null => return None,
            Literal::Bool(b) => Param::new(*b),
            Literal::Int2(n) => Param::new(*n),
            Literal::Int4(n) => Param::new(*n),
            Literal::Int8(n) => Param::new(*n),
            Literal::Float4(n) => Param::new(*n),
            Literal::Float8(n) => Param::new(*n),
            Literal::Text(s) => Param::new(s.clone()),
            Literal::Timestamp(ts) => Param::new(*ts),
            Literal::Date(d) => Param::new(*d),
        };
        Some(param)
    }
}

/// Quote a string as a SQL string literal.
///
/// Single quotes are doubled; a string containing backslashes is emitted as an
/// escape string (`E'...'`) with the backslashes doubled.
pub fn quote_literal(s: &str) -> String {
    let escaped = s.replace('\'', "''");
    if escaped.contains('\\') {
        format!("E'{}'", escaped.replace('\\', "\\\\"))
    } else {
        format!("'{}'", escaped)
    }
}

/// A node of the statement tree.
#[derive(Clone, Debug)]
pub enum Term {
    /// Plain literal, rendered verbatim.
    Literal(Literal),
    /// Bound argument, rendered as the next `$n`.
    Argument(Param),
    /// Explicitly unbound value, rendered as its literal form.
    Unbound(Literal),
    /// `any(<inner>)`; the inner term is classified with [`Term::arg`] when rendered.
    Any(Box<Term>),
    /// `all(<inner>)`; the inner term is classified with [`Term::arg`] when rendered.
    All(Box<Term>),
    /// The `default` keyword.
    Default,
    /// Children joined by the group separator.
    Group(Group),
    /// Children joined by the group separator, wrapped in `prefix(...)`.
    Paren(ParenGroup),
    /// Output of a nested builder (statement, condition, join), space separated.
    Nested(Vec<Term>),
}

impl Term {
    /// Classify as a bound argument.
    ///
    /// Only plain literals change; unbound, `any`/`all`, `default` and structural
    /// terms are returned untouched.
    pub fn arg(self) -> Term {
        match self {
            Term::Literal(Literal::Null) => Term::Unbound(Literal::Null),
            Term::Literal(lit) => match lit.to_param() {
                Some(p) => Term::Argument(p),
                None => Term::Unbound(lit),
            },
            other => other,
        }
    }

    /// Mark as an unbound value.
    pub fn not_arg(self) -> Term {
        match self {
            Term::Literal(lit) => Term::Unbound(lit),
            other => other,
        }
    }

    /// Mark as raw SQL.
    ///
    /// For `any`/`all` wrappers the raw marker moves inside, so `raw(any("path"))`
    /// renders `any(path)`.
    pub fn raw(self) -> Term {
        match self {
            Term::Literal(lit) => Term::Unbound(lit),
            Term::Any(inner) => Term::Any(Box::new(inner.raw())),
            Term::All(inner) => Term::All(Box::new(inner.raw())),
            other => other,
        }
    }

    /// Whether this term is an `any`/`all` wrapper or the `default` marker.
    fn is_wrapper(&self) -> bool {
        matches!(self, Term::Any(_) | Term::All(_) | Term::Default)
    }
}

/// Mark a value as a bound argument (`$n`).
pub fn arg(value: impl Into<Term>) -> Term {
    value.into().arg()
}

/// Mark a value as unbound: it is rendered as a literal instead of `$n`.
pub fn not_arg(value: impl Into<Term>) -> Term {
    value.into().not_arg()
}

/// Mark a value as raw SQL.
pub fn raw(value: impl Into<Term>) -> Term {
    value.into().raw()
}

/// Wrap a value as `any(...)`.
pub fn any(value: impl Into<Term>) -> Term {
    let value = value.into();
    if value.is_wrapper() {
        return value;
    }
    Term::Any(Box::new(value))
}

/// Wrap a value as `all(...)`.
pub fn all(value: impl Into<Term>) -> Term {
    let value = value.into();
    if value.is_wrapper() {
        return value;
    }
    Term::All(Box::new(value))
}

/// The `default` keyword, e.g. for an INSERT value.
pub const DEFAULT: Term = Term::Default;

/// Bind any `ToSql` value (arrays, uuids, typed NULLs via `Option`, ...).
pub fn param<T: ToSql + Send + Sync + 'static>(value: T) -> Term {
    Term::Argument(Param::new(value))
}

/// Bind a value as JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Term> {
    Ok(param(serde_json::to_value(value)?))
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Param> for Term {
    fn from(p: Param) -> Self {
        Term::Argument(p)
    }
}

impl From<Group> for Term {
    fn from(g: Group) -> Self {
        Term::Group(g)
    }
}

impl From<ParenGroup> for Term {
    fn from(p: ParenGroup) -> Self {
        Term::Paren(p)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Literal(Literal::Text(s.to_string()))
    }
}

impl From<&String> for Term {
    fn from(s: &String) -> Self {
        Term::Literal(Literal::Text(s.clone()))
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Literal(Literal::Text(s))
    }
}

macro_rules! impl_literal_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Term {
                fn from(v: $t) -> Self {
                    Term::Literal(Literal::$variant(v))
                }
            }
        )*
    };
}

impl_literal_from!(
    bool => Bool,
    i16 => Int2,
    i32 => Int4,
    i64 => Int8,
    f32 => Float4,
    f64 => Float8,
    DateTime<Utc> => Timestamp,
    NaiveDate => Date,
);

/// Conversion of one or more values into clause terms.
///
/// Implemented for single scalars, `Vec`, arrays, slices and tuples (for rows
/// mixing types, e.g. `("tester", raw("now()"))`).
pub trait IntoTerms {
    fn into_terms(self) -> Vec<Term>;
}

macro_rules! impl_into_terms_single {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoTerms for $t {
                fn into_terms(self) -> Vec<Term> {
                    vec![self.into()]
                }
            }
        )*
    };
}

impl_into_terms_single!(
    Term,
    Literal,
    Param,
    &str,
    &String,
    String,
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    DateTime<Utc>,
    NaiveDate,
);

impl IntoTerms for () {
    fn into_terms(self) -> Vec<Term> {
        Vec::new()
    }
}

impl<T: Into<Term>> IntoTerms for Vec<T> {
    fn into_terms(self) -> Vec<Term> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Term>, const N: usize> IntoTerms for [T; N] {
    fn into_terms(self) -> Vec<Term> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Term> + Clone> IntoTerms for &[T] {
    fn into_terms(self) -> Vec<Term> {
        self.iter().cloned().map(Into::into).collect()
    }
}

macro_rules! impl_into_terms_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Term>),+> IntoTerms for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_terms(self) -> Vec<Term> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_terms_tuple!(A);
impl_into_terms_tuple!(A, B);
impl_into_terms_tuple!(A, B, C);
impl_into_terms_tuple!(A, B, C, D);
impl_into_terms_tuple!(A, B, C, D, E);
impl_into_terms_tuple!(A, B, C, D, E, F);
impl_into_terms_tuple!(A, B, C, D, E, F, G);
impl_into_terms_tuple!(A, B, C, D, E, F, G, H);
impl_into_terms_tuple!(A, B, C, D, E, F, G, H, I);
impl_into_terms_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_into_terms_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_into_terms_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);
