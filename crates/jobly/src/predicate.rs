//! Search predicate composition.
//!
//! Each supplied criterion contributes one clause to a conjunctive `WHERE`.
//! Clauses that bind a value take the next placeholder from a counter shared
//! by the whole predicate; clauses that bind nothing (`equity > 0`) don't, so
//! numbering stays contiguous whichever criteria are present.

use crate::placeholder::{Placeholder, Placeholders};
use crate::value::SqlValue;
use serde::{Deserialize, Deserializer};

/// Column searched by the title substring filter.
pub const TITLE_COLUMN: &str = "title";
/// Column compared by the minimum-salary filter.
pub const SALARY_COLUMN: &str = "salary";
/// Column tested by the has-equity flag.
pub const EQUITY_COLUMN: &str = "equity";

/// A single planned predicate over a trusted column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `<column> ILIKE $n`
    ContainsCi {
        column: &'static str,
        placeholder: Placeholder,
    },
    /// `<column> >= $n`
    AtLeast {
        column: &'static str,
        placeholder: Placeholder,
    },
    /// `<column> > 0`
    Positive { column: &'static str },
}

impl Predicate {
    pub fn to_sql(&self) -> String {
        match self {
            Self::ContainsCi {
                column,
                placeholder,
            } => format!("{column} ILIKE {placeholder}"),
            Self::AtLeast {
                column,
                placeholder,
            } => format!("{column} >= {placeholder}"),
            Self::Positive { column } => format!("{column} > 0"),
        }
    }

    /// The placeholder this predicate binds, if any.
    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Self::ContainsCi { placeholder, .. } | Self::AtLeast { placeholder, .. } => {
                Some(*placeholder)
            }
            Self::Positive { .. } => None,
        }
    }
}

/// Accumulates predicates and their bind values in order.
///
/// Column names are `&'static str` so only names fixed at compile time can
/// reach the SQL text; user input only ever travels as a bind value.
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    predicates: Vec<Predicate>,
    values: Vec<SqlValue>,
    placeholders: Placeholders,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match; `text` is wrapped as `%text%`.
    pub fn contains_ci(&mut self, column: &'static str, text: &str) -> &mut Self {
        let placeholder = self.placeholders.issue();
        self.values.push(SqlValue::Text(format!("%{text}%")));
        self.predicates.push(Predicate::ContainsCi {
            column,
            placeholder,
        });
        self
    }

    /// Inclusive lower bound; `value` is bound unconverted.
    pub fn at_least(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        let placeholder = self.placeholders.issue();
        self.values.push(value.into());
        self.predicates.push(Predicate::AtLeast {
            column,
            placeholder,
        });
        self
    }

    /// `column > 0`, binding nothing.
    pub fn positive(&mut self, column: &'static str) -> &mut Self {
        self.predicates.push(Predicate::Positive { column });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn build(self) -> CompiledPredicate {
        CompiledPredicate {
            clauses: self.predicates.iter().map(Predicate::to_sql).collect(),
            values: self.values,
        }
    }
}

/// Conjunctive clauses and the values bound by them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledPredicate {
    pub clauses: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl CompiledPredicate {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `" WHERE a AND b"`, or an empty string when there are no clauses.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.clauses.join(" AND "))
    }
}

/// Optional job search filters.
///
/// `has_equity` is a gate rather than an equality filter: only `Some(true)`
/// adds a predicate. When deserialized, any JSON value other than a literal
/// boolean (for example the string `"true"`) is treated as absent.
///
/// A key that is present always filters: `"minSalary": null` binds NULL (and
/// so matches nothing), while `"title": null` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub min_salary: Option<SqlValue>,
    #[serde(default, deserialize_with = "literal_bool")]
    pub has_equity: Option<bool>,
}

// Only called for keys that appear; absent keys fall back to `None`.
fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

fn literal_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value.as_bool())
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min: impl Into<SqlValue>) -> Self {
        self.min_salary = Some(min.into());
        self
    }

    pub fn has_equity(mut self, flag: bool) -> Self {
        self.has_equity = Some(flag);
        self
    }
}

/// Compile `criteria` into clauses, in the fixed order title, salary, equity.
pub fn compile_search_predicate(criteria: &SearchCriteria) -> CompiledPredicate {
    let mut builder = PredicateBuilder::new();
    if let Some(title) = &criteria.title {
        builder.contains_ci(TITLE_COLUMN, title);
    }
    if let Some(min) = &criteria.min_salary {
        builder.at_least(SALARY_COLUMN, min.clone());
    }
    if criteria.has_equity == Some(true) {
        builder.positive(EQUITY_COLUMN);
    }
    builder.build()
}

#[cfg(test)]
mod tests;
