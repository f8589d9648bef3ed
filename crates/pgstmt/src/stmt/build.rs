//! Term tree compiler and the `(sql, params)` result it produces.

use crate::client::GenericClient;
use crate::error::StmtResult;
use crate::row::FromRow;
use crate::stmt::param::{Param, ParamList};
use crate::stmt::term::Term;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Render a term tree into query text, numbering placeholders in traversal order.
pub fn compile(terms: &[Term]) -> BuiltQuery {
    let mut compiler = Compiler::default();
    let sql = compiler.write_terms(terms, " ");
    let params = compiler.params.into_vec();

    #[cfg(feature = "tracing")]
    tracing::trace!(target: "pgstmt.build", sql = %sql, params = params.len(), "compiled statement");

    BuiltQuery::new(sql, params)
}

#[derive(Default)]
struct Compiler {
    params: ParamList,
}

impl Compiler {
    /// Render `terms` joined by `sep`, skipping children that render to nothing.
    fn write_terms(&mut self, terms: &[Term], sep: &str) -> String {
        let mut parts = Vec::with_capacity(terms.len());
        for term in terms {
            let s = self.write_term(term);
            if !s.is_empty() {
                parts.push(s);
            }
        }
        parts.join(sep)
    }

    fn write_term(&mut self, term: &Term) -> String {
        match term {
            Term::Literal(lit) | Term::Unbound(lit) => lit.render(),
            Term::Argument(param) => self.bind(param.clone()),
            Term::Any(inner) => format!("any({})", self.write_bindable(inner)),
            Term::All(inner) => format!("all({})", self.write_bindable(inner)),
            Term::Default => "default".to_string(),
            Term::Group(group) => self.write_terms(group.terms(), group.sep()),
            Term::Paren(paren) => {
                let inner = self.write_terms(paren.group().terms(), paren.group().sep());
                if inner.is_empty() {
                    String::new()
                } else {
                    format!("{}({})", paren.prefix(), inner)
                }
            }
            Term::Nested(terms) => self.write_terms(terms, " "),
        }
    }

    /// Render the payload of `any`/`all`: plain literals bind, everything else
    /// renders as usual.
    fn write_bindable(&mut self, term: &Term) -> String {
        match term {
            Term::Literal(lit) => match lit.to_param() {
                Some(param) => self.bind(param),
                None => lit.render(),
            },
            other => self.write_term(other),
        }
    }

    fn bind(&mut self, param: Param) -> String {
        let n = self.params.bind(param);
        format!("${}", n)
    }
}

/// A compiled statement: query text plus its arguments in placeholder order.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Param>,
}

impl BuiltQuery {
    pub fn new(sql: String, params: Vec<Param>) -> Self {
        Self { sql, params }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::to_sql_ref).collect()
    }

    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.sql, self.params)
    }

    fn log(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "pgstmt.sql", sql = %self.sql, params = self.params.len(), "executing");
    }

    // ==================== Execution ====================

    /// Execute and return all rows.
    pub async fn query(&self, conn: &impl GenericClient) -> StmtResult<Vec<Row>> {
        self.log();
        conn.query(&self.sql, &self.params_ref()).await
    }

    /// Execute and return the first row, or [`StmtError::NotFound`](crate::StmtError::NotFound).
    pub async fn query_one(&self, conn: &impl GenericClient) -> StmtResult<Row> {
        self.log();
        conn.query_one(&self.sql, &self.params_ref()).await
    }

    /// Execute and return at most one row.
    pub async fn query_opt(&self, conn: &impl GenericClient) -> StmtResult<Option<Row>> {
        self.log();
        conn.query_opt(&self.sql, &self.params_ref()).await
    }

    /// Execute and return the affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> StmtResult<u64> {
        self.log();
        conn.execute(&self.sql, &self.params_ref()).await
    }

    /// Execute and map all rows to `T`.
    pub async fn fetch_all<T: FromRow>(&self, conn: &impl GenericClient) -> StmtResult<Vec<T>> {
        let rows = self.query(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and map the first row to `T`.
    pub async fn fetch_one<T: FromRow>(&self, conn: &impl GenericClient) -> StmtResult<T> {
        let row = self.query_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute and map at most one row to `T`.
    pub async fn fetch_opt<T: FromRow>(&self, conn: &impl GenericClient) -> StmtResult<Option<T>> {
        let row = self.query_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }
}
