use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::partial_update::{FieldMap, UpdatePayload, compile_partial_update};
use crate::query::Query;
use crate::row::{FromRow, RowExt};
use serde::Serialize;
use tokio_postgres::Row;

/// Request field names that differ from the `companies` column names.
pub const COMPANY_FIELDS: FieldMap =
    FieldMap::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

const COMPANY_COLUMNS: &[&str] = &["handle", "name", "description", "num_employees", "logo_url"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

impl Company {
    /// Look up a company by handle.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<Company> {
        Query::new(format!(
            "SELECT {} FROM companies WHERE handle = $1",
            COMPANY_COLUMNS.join(", ")
        ))
        .tag("companies.get")
        .bind(handle)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
    }

    /// Build the partial update statement for one company.
    ///
    /// Request names (`numEmployees`, `logoUrl`) are translated through
    /// [`COMPANY_FIELDS`]; the handle is bound after the `SET` values.
    pub fn update_query(handle: &str, payload: &UpdatePayload) -> JoblyResult<Query> {
        let compiled = compile_partial_update(payload, &COMPANY_FIELDS)?;
        let sql = compiled.update_statement("companies", "handle", COMPANY_COLUMNS)?;
        Ok(Query::new(sql)
            .tag("companies.update")
            .bind_all(compiled.values)
            .bind(handle))
    }

    /// Apply a partial update; only the supplied fields change.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        payload: &UpdatePayload,
    ) -> JoblyResult<Company> {
        Self::update_query(handle, payload)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn update_query_translates_request_names() {
        let payload = UpdatePayload::new()
            .set("numEmployees", 12)
            .set("name", "Acme")
            .set("logoUrl", SqlValue::Null);

        let q = Company::update_query("acme", &payload).unwrap();

        assert_eq!(
            q.sql(),
            r#"UPDATE companies SET "num_employees"=$1, "name"=$2, "logo_url"=$3 WHERE handle = $4 RETURNING handle, name, description, num_employees, logo_url"#
        );
        assert_eq!(
            q.params(),
            &[
                SqlValue::Int(12),
                SqlValue::Text("Acme".into()),
                SqlValue::Null,
                SqlValue::Text("acme".into()),
            ]
        );
    }

    #[test]
    fn update_query_rejects_empty_payload() {
        let err = Company::update_query("acme", &UpdatePayload::new()).unwrap_err();
        assert!(err.is_validation());
    }
}
