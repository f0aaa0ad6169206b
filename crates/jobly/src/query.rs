//! Compiled statement plus owned bind values.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use crate::value::SqlValue;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Longest SQL text (in bytes) written to a log event before truncation.
const MAX_LOGGED_SQL: usize = 200;

/// A SQL string with pre-numbered placeholders (`$1, $2, ...`) and its values.
///
/// Executing emits a `tracing` event on target `jobly.sql` before the
/// statement is sent, and another when it fails.
#[must_use]
#[derive(Debug, Clone)]
pub struct Query {
    sql: String,
    params: Vec<SqlValue>,
    tag: &'static str,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            tag: "-",
        }
    }

    /// Label the statement in logs (e.g. `jobs.update`).
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// Bind the next parameter value.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Bind several values in order.
    pub fn bind_all(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        self.params.extend(values);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    fn trace(&self) {
        tracing::debug!(
            target: "jobly.sql",
            tag = self.tag,
            param_count = self.params.len(),
            sql = %truncate_sql(&self.sql, MAX_LOGGED_SQL),
        );
    }

    fn trace_result<T>(&self, result: JoblyResult<T>) -> JoblyResult<T> {
        if let Err(err) = &result {
            if err.is_client_error() {
                tracing::debug!(target: "jobly.sql", tag = self.tag, error = %err, "rejected");
            } else {
                tracing::warn!(target: "jobly.sql", tag = self.tag, error = %err, "failed");
            }
        }
        result
    }

    /// Execute and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        self.trace();
        let params = self.params_ref();
        let result = conn.query(&self.sql, &params).await;
        self.trace_result(result)
    }

    /// Execute and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and return the first row; no rows is [`JoblyError::NotFound`](crate::JoblyError::NotFound).
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        self.trace();
        let params = self.params_ref();
        let result = conn.query_one(&self.sql, &params).await;
        self.trace_result(result)
    }

    /// Execute and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        self.trace();
        let params = self.params_ref();
        let result = conn.query_opt(&self.sql, &params).await;
        self.trace_result(result)
    }

    /// Execute and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute and return the affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        self.trace();
        let params = self.params_ref();
        let result = conn.execute(&self.sql, &params).await;
        self.trace_result(result)
    }
}

/// Cut `sql` to at most `max` bytes on a char boundary, appending `...`.
fn truncate_sql(sql: &str, max: usize) -> std::borrow::Cow<'_, str> {
    if sql.len() <= max {
        return sql.into();
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end]).into()
}
