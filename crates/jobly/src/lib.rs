//! # jobly
//!
//! Query compilation and storage services for a small job board on Postgres.
//!
//! ## Features
//!
//! - **Partial updates**: turn a sparse field/value payload into a numbered
//!   `SET` fragment plus its ordered bind values (`compile_partial_update`)
//! - **Search predicates**: compose optional job filters into a `WHERE`
//!   clause with placeholders (`compile_search_predicate`)
//! - **Values are always bound**: identifiers are quoted, user text never
//!   becomes SQL
//! - **Transaction-friendly**: services take any `GenericClient`
//!
//! ```ignore
//! use jobly::{Job, SearchCriteria, UpdatePayload};
//!
//! let jobs = Job::find_all(&client, &SearchCriteria::new().title("eng").has_equity(true)).await?;
//!
//! let payload = UpdatePayload::new().set("salary", 120_000);
//! let job = Job::update(&client, jobs[0].id, &payload).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod input;
pub mod models;
pub mod partial_update;
pub mod placeholder;
pub mod predicate;
pub mod query;
pub mod row;
pub mod value;

pub use auth::{Principal, ensure_admin, ensure_logged_in};
pub use client::GenericClient;
pub use config::JoblyConfig;
pub use error::{JoblyError, JoblyResult};
pub use ident::Ident;
pub use input::{
    JobPatch, JobSearchQuery, NewJob, ValidationCode, ValidationError, ValidationErrors,
};
pub use models::{COMPANY_FIELDS, Company, JOB_FIELDS, Job, JobDetail};
pub use partial_update::{
    CompiledFragment, FieldMap, SetClause, UpdatePayload, compile_partial_update,
};
pub use placeholder::{Placeholder, Placeholders};
pub use predicate::{
    CompiledPredicate, Predicate, PredicateBuilder, SearchCriteria, compile_search_predicate,
};
pub use query::Query;
pub use row::{FromRow, RowExt};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;
