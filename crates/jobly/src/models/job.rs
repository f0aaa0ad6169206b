use super::company::Company;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::input::NewJob;
use crate::partial_update::{FieldMap, UpdatePayload, compile_partial_update};
use crate::predicate::{SearchCriteria, compile_search_predicate};
use crate::query::Query;
use crate::row::{FromRow, RowExt};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_postgres::Row;

/// Job request fields already match the `jobs` column names.
pub const JOB_FIELDS: FieldMap = FieldMap::identity();

const JOB_COLUMNS: &[&str] = &["id", "title", "salary", "equity", "company_handle"];

/// A row of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job together with the company offering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

fn no_job(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}

impl Job {
    /// Insert a new job. Titles are unique; a repeat is [`JoblyError::Duplicate`].
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        new.validate()?;

        let existing = Query::new("SELECT title FROM jobs WHERE title = $1")
            .tag("jobs.create.duplicate_check")
            .bind(new.title.as_str())
            .fetch_opt(conn)
            .await?;
        if existing.is_some() {
            return Err(JoblyError::Duplicate(format!("Duplicate job: {}", new.title)));
        }

        Query::new(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_COLUMNS.join(", ")
        ))
        .tag("jobs.create")
        .bind(new.title.as_str())
        .bind(new.salary)
        .bind(new.equity)
        .bind(new.company_handle.as_str())
        .fetch_one_as(conn)
        .await
    }

    /// The filtered listing statement, ordered by title.
    pub fn search_query(criteria: &SearchCriteria) -> Query {
        let predicate = compile_search_predicate(criteria);
        Query::new(format!(
            "SELECT {} FROM jobs{} ORDER BY title",
            JOB_COLUMNS.join(", "),
            predicate.where_clause()
        ))
        .tag("jobs.find_all")
        .bind_all(predicate.values)
    }

    /// All jobs matching `criteria`, ordered by title.
    pub async fn find_all(
        conn: &impl GenericClient,
        criteria: &SearchCriteria,
    ) -> JoblyResult<Vec<Job>> {
        Self::search_query(criteria).fetch_all_as(conn).await
    }

    /// One job with its company.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
        let job: Job = Query::new(format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS.join(", ")
        ))
        .tag("jobs.get")
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| no_job(id))?;

        let company = Company::get(conn, &job.company_handle).await?;

        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    /// The partial update statement for one job; the id is bound last.
    pub fn update_query(id: i32, payload: &UpdatePayload) -> JoblyResult<Query> {
        let compiled = compile_partial_update(payload, &JOB_FIELDS)?;
        let sql = compiled.update_statement("jobs", "id", JOB_COLUMNS)?;
        Ok(Query::new(sql)
            .tag("jobs.update")
            .bind_all(compiled.values)
            .bind(id))
    }

    /// Apply a partial update; fields absent from `payload` are untouched.
    pub async fn update(
        conn: &impl GenericClient,
        id: i32,
        payload: &UpdatePayload,
    ) -> JoblyResult<Job> {
        Self::update_query(id, payload)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| no_job(id))
    }

    /// Delete a job.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let deleted = Query::new("DELETE FROM jobs WHERE id = $1")
            .tag("jobs.remove")
            .bind(id)
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(no_job(id));
        }
        Ok(())
    }
}
