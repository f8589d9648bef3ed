//! Generic client trait: the hand-off point between built statements and a
//! live connection.

use crate::error::{StmtError, StmtResult};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Anything a [`BuiltQuery`](crate::stmt::BuiltQuery) can run on.
///
/// Implemented for a plain connection and for a transaction, so the same
/// statement code works in both places.
pub trait GenericClient: Send + Sync {
    /// Run `sql` and collect every row.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = StmtResult<Vec<Row>>> + Send;

    /// First row of the result; [`StmtError::NotFound`] when there is none.
    /// Further rows are discarded.
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = StmtResult<Row>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| StmtError::not_found("Expected one row, got none"))
        }
    }

    /// First row of the result, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = StmtResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Run `sql` and report how many rows it touched.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = StmtResult<u64>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StmtResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(StmtError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StmtResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(StmtError::from_db_error)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StmtResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(StmtError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StmtResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(StmtError::from_db_error)
    }
}
