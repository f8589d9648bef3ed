//! Mapping result rows onto caller types.

use crate::error::{StmtError, StmtResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Builds a value from one result row.
///
/// # Example
///
/// ```ignore
/// use pgstmt::{FromRow, RowExt, StmtResult};
///
/// struct User {
///     id: i64,
///     email: Option<String>,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &tokio_postgres::Row) -> StmtResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             email: row.try_get_column("email")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> StmtResult<Self>;
}

/// Column access that reports failures as [`StmtError::Decode`].
pub trait RowExt {
    fn try_get_column<T>(&self, column: &str) -> StmtResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Read a `json`/`jsonb` column and deserialize it.
    fn try_get_json<T>(&self, column: &str) -> StmtResult<T>
    where
        T: serde::de::DeserializeOwned;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> StmtResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| StmtError::decode(column, e.to_string()))
    }

    fn try_get_json<T>(&self, column: &str) -> StmtResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value: serde_json::Value = self.try_get_column(column)?;
        serde_json::from_value(value).map_err(|e| StmtError::decode(column, e.to_string()))
    }
}

macro_rules! impl_from_row_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromRow for $t {
                fn from_row(row: &Row) -> StmtResult<Self> {
                    row.try_get(0).map_err(|e| StmtError::decode("0", e.to_string()))
                }
            }
        )*
    };
}

// Single-column results, e.g. `select count(*)` or `returning id`.
impl_from_row_scalar!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    serde_json::Value,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
);
