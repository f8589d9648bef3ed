//! # pgstmt
//!
//! Parameterized PostgreSQL statement builders for Rust.
//!
//! ## Features
//!
//! - **Placeholders that line up**: `$n` numbering is assigned while rendering,
//!   so the argument list always matches the query text
//! - **Closure builders**: `select`, `insert`, `update`, `delete` and `union`
//!   take a closure that configures a fresh statement
//! - **Nested conditions**: AND/OR/NOT groups and sub-selects anywhere a value fits
//! - **Execution**: a [`BuiltQuery`] runs on anything implementing [`GenericClient`]
//! - **Retryable transactions**: [`tx::run_in_tx`] retries on serialization failure
//!
//! ## Example
//!
//! ```ignore
//! use pgstmt::{FromRow, RowExt, StmtResult};
//!
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl FromRow for User {
//!     fn from_row(row: &tokio_postgres::Row) -> StmtResult<Self> {
//!         Ok(Self {
//!             id: row.try_get_column("id")?,
//!             name: row.try_get_column("name")?,
//!         })
//!     }
//! }
//!
//! let users: Vec<User> = pgstmt::select(|b| {
//!     b.columns(("id", "name"));
//!     b.from("users");
//!     b.filter(|c| {
//!         c.eq("status", "active");
//!     });
//!     b.order_by("created_at").desc();
//!     b.limit(10);
//! })
//! .fetch_all(&client)
//! .await?;
//! ```

pub mod backoff;
pub mod client;
pub mod error;
pub mod row;
pub mod stmt;
pub mod tx;

pub use backoff::{Backoff, ExponentialBackoff, Jitter, LinearBackoff};
pub use client::GenericClient;
pub use error::{StmtError, StmtResult};
pub use row::{FromRow, RowExt};
pub use tx::TxOptions;

pub use stmt::{
    BuiltQuery, Cond, DEFAULT, all, any, arg, delete, insert, json, not_arg, param, raw, select,
    union, update,
};
