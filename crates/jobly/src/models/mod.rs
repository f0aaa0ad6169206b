//! Entity services.
//!
//! Every function takes `&impl GenericClient`, so callers can pass a pooled
//! connection or run several calls inside one transaction.

pub mod company;
pub mod job;

pub use company::{COMPANY_FIELDS, Company};
pub use job::{JOB_FIELDS, Job, JobDetail};
