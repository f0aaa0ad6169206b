//! Request-shape validation for job inputs.
//!
//! These checks run before anything reaches the SQL compilers, which assume
//! their input is already well-formed.

use crate::error::JoblyResult;
use crate::partial_update::UpdatePayload;
use crate::predicate::SearchCriteria;
use crate::value::SqlValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A machine-friendly validation code.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCode {
    Required,
    Range,
    Type,
    Unknown,
}

impl ValidationCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Range => "range",
            Self::Type => "type",
            Self::Unknown => "unknown",
        }
    }
}

impl Serialize for ValidationCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// A collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.items.push(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.items.iter()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn require_non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(ValidationError::new(
                field,
                ValidationCode::Required,
                format!("{field} must not be empty"),
            ));
        }
    }

    fn check_salary(&mut self, field: &str, salary: i64) {
        if salary < 0 {
            self.push(ValidationError::new(
                field,
                ValidationCode::Range,
                format!("{field} must be >= 0"),
            ));
        }
    }

    fn check_equity(&mut self, equity: Decimal) {
        if equity < Decimal::ZERO || equity > Decimal::ONE {
            self.push(ValidationError::new(
                "equity",
                ValidationCode::Range,
                "equity must be between 0 and 1",
            ));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

/// Body of a job creation request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::default();
        errs.require_non_empty("title", &self.title);
        errs.require_non_empty("company_handle", &self.company_handle);
        if let Some(salary) = self.salary {
            errs.check_salary("salary", salary.into());
        }
        if let Some(equity) = self.equity {
            errs.check_equity(equity);
        }
        errs.into_result()
    }
}

// Present-but-null becomes `Some(None)`; absent stays `None` via `#[serde(default)]`.
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Body of a job patch request. `id` and `company_handle` cannot change.
///
/// `salary` and `equity` distinguish "absent" (`None`, column untouched) from
/// an explicit `null` (`Some(None)`, column cleared).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub equity: Option<Option<Decimal>>,
}

impl JobPatch {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::default();
        if let Some(title) = &self.title {
            errs.require_non_empty("title", title);
        }
        if let Some(Some(salary)) = self.salary {
            errs.check_salary("salary", salary.into());
        }
        if let Some(Some(equity)) = self.equity {
            errs.check_equity(equity);
        }
        errs.into_result()
    }

    /// Validate and convert into an update payload in field declaration order.
    ///
    /// An empty patch yields an empty payload; the compiler rejects it.
    pub fn into_payload(self) -> JoblyResult<UpdatePayload> {
        self.validate()?;
        let mut payload = UpdatePayload::new();
        if let Some(title) = self.title {
            payload.insert("title", title);
        }
        if let Some(salary) = self.salary {
            payload.insert("salary", salary);
        }
        if let Some(equity) = self.equity {
            payload.insert("equity", equity);
        }
        Ok(payload)
    }
}

/// Query-string form of a job search (`?title=eng&minSalary=5000&hasEquity=true`).
pub struct JobSearchQuery;

impl JobSearchQuery {
    /// Coerce raw query-string pairs into [`SearchCriteria`].
    ///
    /// `minSalary` must be a non-negative integer. `hasEquity` is `true` only
    /// for the exact text `true`; any other text means `false`.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> JoblyResult<SearchCriteria>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = SearchCriteria::new();
        let mut errs = ValidationErrors::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "title" => criteria.title = Some(value.to_string()),
                "minSalary" => match value.trim().parse::<i64>() {
                    Ok(min) => {
                        errs.check_salary(key, min);
                        criteria.min_salary = Some(SqlValue::Int(min));
                    }
                    Err(_) => errs.push(ValidationError::new(
                        key,
                        ValidationCode::Type,
                        format!("minSalary must be an integer, got {value:?}"),
                    )),
                },
                "hasEquity" => criteria.has_equity = Some(value == "true"),
                other => errs.push(ValidationError::new(
                    other,
                    ValidationCode::Unknown,
                    format!("unknown search filter {other:?}"),
                )),
            }
        }

        errs.into_result()?;
        Ok(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoblyError;
    use std::str::FromStr;

    #[test]
    fn new_job_accepts_string_or_number_equity() {
        let a: NewJob = serde_json::from_str(
            r#"{"title": "new", "salary": 123456, "equity": "0.5", "company_handle": "c1"}"#,
        )
        .unwrap();
        let b: NewJob = serde_json::from_str(
            r#"{"title": "new", "salary": 123456, "equity": 0.5, "company_handle": "c1"}"#,
        )
        .unwrap();
        assert_eq!(a.equity, b.equity);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn new_job_collects_every_failure() {
        let job = NewJob {
            title: " ".into(),
            salary: Some(-1),
            equity: Some(Decimal::from_str("1.5").unwrap()),
            company_handle: String::new(),
        };
        let errs = job.validate().unwrap_err();
        assert_eq!(errs.len(), 4);
        assert!(errs.iter().any(|e| e.field == "salary" && e.code.as_str() == "range"));
    }

    #[test]
    fn new_job_rejects_unknown_fields() {
        let res = serde_json::from_str::<NewJob>(
            r#"{"title": "t", "company_handle": "c1", "is_admin": true}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: JobPatch = serde_json::from_str(r#"{"salary": null}"#).unwrap();
        assert_eq!(patch.salary, Some(None));
        assert_eq!(patch.equity, None);

        let payload = patch.into_payload().unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("salary"), Some(&SqlValue::Null));
    }

    #[test]
    fn patch_payload_follows_declaration_order() {
        let patch: JobPatch =
            serde_json::from_str(r#"{"equity": "0.5", "salary": 500, "title": "New"}"#).unwrap();
        let payload = patch.into_payload().unwrap();
        assert_eq!(
            payload.fields().collect::<Vec<_>>(),
            vec!["title", "salary", "equity"]
        );
    }

    #[test]
    fn patch_cannot_touch_company_or_id() {
        assert!(serde_json::from_str::<JobPatch>(r#"{"company_handle": "c2"}"#).is_err());
        assert!(serde_json::from_str::<JobPatch>(r#"{"id": 3}"#).is_err());
    }

    #[test]
    fn empty_patch_gives_empty_payload() {
        let payload = JobPatch::default().into_payload().unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn invalid_patch_is_invalid_input() {
        let patch = JobPatch {
            salary: Some(Some(-5)),
            ..Default::default()
        };
        assert!(matches!(
            patch.into_payload(),
            Err(JoblyError::InvalidInput(_))
        ));
    }

    #[test]
    fn search_query_coerces_strings() {
        let criteria = JobSearchQuery::from_query_pairs([
            ("title", "eng"),
            ("minSalary", "50000"),
            ("hasEquity", "true"),
        ])
        .unwrap();
        assert_eq!(criteria.title.as_deref(), Some("eng"));
        assert_eq!(criteria.min_salary, Some(SqlValue::Int(50_000)));
        assert_eq!(criteria.has_equity, Some(true));
    }

    #[test]
    fn search_query_has_equity_other_text_is_false() {
        for raw in ["false", "TRUE", "1", "yes", ""] {
            let criteria = JobSearchQuery::from_query_pairs([("hasEquity", raw)]).unwrap();
            assert_eq!(criteria.has_equity, Some(false), "{raw:?}");
        }
    }

    #[test]
    fn search_query_rejects_bad_min_salary_and_unknown_keys() {
        let err = JobSearchQuery::from_query_pairs([("minSalary", "lots"), ("nameLike", "x")])
            .unwrap_err();
        match err {
            JoblyError::InvalidInput(errs) => {
                assert_eq!(errs.len(), 2);
                assert_eq!(errs.items[0].code, ValidationCode::Type);
                assert_eq!(errs.items[1].code, ValidationCode::Unknown);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
