//! Partial-update compilation.
//!
//! Turns a sparse set of changed fields into the `SET` list of an `UPDATE`
//! statement plus its ordered bind values:
//!
//! ```ignore
//! use jobly::{FieldMap, UpdatePayload, compile_partial_update};
//!
//! const USER_FIELDS: FieldMap = FieldMap::new(&[("firstName", "first_name")]);
//!
//! let payload = UpdatePayload::new().set("firstName", "Aliya").set("age", 32);
//! let compiled = compile_partial_update(&payload, &USER_FIELDS)?;
//! assert_eq!(compiled.fragment, r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::ident::Ident;
use crate::placeholder::{Placeholder, Placeholders};
use crate::value::SqlValue;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// Domain field name to storage column name aliases for one entity type.
///
/// Fields without an entry map to a column of the same name.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldMap {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// A map with no aliases.
    pub const fn identity() -> Self {
        Self { entries: &[] }
    }

    /// Storage column for `field`, or `field` itself when it has no alias.
    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(from, _)| *from == field)
            .map_or(field, |&(_, to)| to)
    }
}

/// Ordered field/value pairs describing one partial update.
///
/// Field order decides placeholder order. Setting a field twice keeps its
/// original position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    entries: Vec<(String, SqlValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value` (consuming builder form).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set `field` to `value`.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for UpdatePayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = UpdatePayload;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of field names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<UpdatePayload, A::Error> {
        let mut payload = UpdatePayload::new();
        while let Some((field, value)) = map.next_entry::<String, SqlValue>()? {
            payload.insert(field, value);
        }
        Ok(payload)
    }
}

// Reads the object directly so key order follows the document, not a sorted map.
impl<'de> Deserialize<'de> for UpdatePayload {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_map(PayloadVisitor)
    }
}

/// One `"column"=$n` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetClause {
    pub column: Ident,
    pub placeholder: Placeholder,
}

/// The compiled `SET` list and its bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFragment {
    /// `"col1"=$1, "col2"=$2, ...`
    pub fragment: String,
    /// Bind values; `values[i]` belongs to placeholder `$i+1`.
    pub values: Vec<SqlValue>,
}

impl CompiledFragment {
    /// Placeholder index for the first parameter the caller appends after the
    /// `SET` list (typically the primary key).
    pub fn next_placeholder(&self) -> Placeholder {
        Placeholders::starting_after(self.values.len()).peek()
    }

    /// Assemble `UPDATE <table> SET <fragment> WHERE <key> = $<n+1> RETURNING <cols>`.
    ///
    /// The key value must be bound after [`CompiledFragment::values`].
    pub fn update_statement(
        &self,
        table: &str,
        key_column: &str,
        returning: &[&str],
    ) -> JoblyResult<String> {
        let table = Ident::parse(table)?;
        let key = Ident::parse(key_column)?;

        let mut sql = String::from("UPDATE ");
        table.write_sql(&mut sql);
        sql.push_str(" SET ");
        sql.push_str(&self.fragment);
        sql.push_str(" WHERE ");
        key.write_sql(&mut sql);
        sql.push_str(" = ");
        self.next_placeholder().write_sql(&mut sql);
        if !returning.is_empty() {
            sql.push_str(" RETURNING ");
            for (i, col) in returning.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                Ident::parse(col)?.write_sql(&mut sql);
            }
        }
        Ok(sql)
    }
}

/// Plan the `SET` clauses for `payload`, resolving columns through `fields`.
pub fn set_clauses(
    payload: &UpdatePayload,
    fields: &FieldMap,
    placeholders: &mut Placeholders,
) -> JoblyResult<Vec<SetClause>> {
    payload
        .fields()
        .map(|field| {
            Ok(SetClause {
                column: Ident::quoted(fields.resolve(field))?,
                placeholder: placeholders.issue(),
            })
        })
        .collect()
}

/// Compile `payload` into a `SET` fragment and ordered values.
///
/// Fails with [`JoblyError::Validation`] when `payload` is empty.
pub fn compile_partial_update(
    payload: &UpdatePayload,
    fields: &FieldMap,
) -> JoblyResult<CompiledFragment> {
    if payload.is_empty() {
        return Err(JoblyError::validation("No data"));
    }

    let mut placeholders = Placeholders::new();
    let clauses = set_clauses(payload, fields, &mut placeholders)?;

    let mut fragment = String::new();
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            fragment.push_str(", ");
        }
        clause.column.write_sql(&mut fragment);
        fragment.push('=');
        clause.placeholder.write_sql(&mut fragment);
    }

    let values = payload.iter().map(|(_, v)| v.clone()).collect();
    Ok(CompiledFragment { fragment, values })
}
