//! SQL identifier handling.
//!
//! Postgres cannot parameterize identifiers, so table and column names are the
//! one part of a compiled statement that is spliced in as text. [`Ident`]
//! makes that splice safe:
//!
//! - unquoted parts must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted parts allow anything except NUL, with `"` escaped as `""`

use crate::error::{JoblyError, JoblyResult};
use std::iter::Peekable;
use std::str::Chars;

/// One dot-separated segment of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Unquoted(String),
    Quoted(String),
}

/// A table or column name that is safe to render into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Wrap `name` verbatim as a single double-quoted identifier.
    ///
    /// Used for update columns: `first_name` renders as `"first_name"` and
    /// `we"ird` as `"we""ird"`.
    pub fn quoted(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::validation("column name cannot be empty"));
        }
        reject_nul(name)?;
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse `name`, `schema.name` or `"Quoted"."Name"` forms.
    pub fn parse(s: &str) -> JoblyResult<Self> {
        if s.is_empty() {
            return Err(JoblyError::validation("identifier cannot be empty"));
        }
        reject_nul(s)?;

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();
        loop {
            let part = if chars.peek() == Some(&'"') {
                chars.next();
                parse_quoted(&mut chars)?
            } else {
                parse_unquoted(&mut chars)?
            };
            parts.push(part);

            match chars.next() {
                None => break,
                Some('.') if chars.peek().is_some() => {}
                Some('.') => return Err(JoblyError::validation("trailing '.' in identifier")),
                Some(c) => {
                    return Err(JoblyError::validation(format!(
                        "expected '.' between identifier parts, got '{c}'"
                    )));
                }
            }
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    out.push_str(&s.replace('"', "\"\""));
                    out.push('"');
                }
            }
        }
    }
}

fn reject_nul(s: &str) -> JoblyResult<()> {
    if s.contains('\0') {
        return Err(JoblyError::validation(
            "identifier cannot contain NUL character",
        ));
    }
    Ok(())
}

// Opening quote already consumed.
fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> JoblyResult<IdentPart> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                name.push('"');
            }
            Some('"') => break,
            Some(c) => name.push(c),
            None => return Err(JoblyError::validation("unclosed quoted identifier")),
        }
    }
    if name.is_empty() {
        return Err(JoblyError::validation("empty quoted identifier"));
    }
    Ok(IdentPart::Quoted(name))
}

fn parse_unquoted(chars: &mut Peekable<Chars<'_>>) -> JoblyResult<IdentPart> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '.' {
            break;
        }
        let ok = if name.is_empty() {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c == '$' || c.is_ascii_alphanumeric()
        };
        if !ok {
            return Err(JoblyError::validation(format!(
                "invalid character in identifier: '{c}'"
            )));
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return Err(JoblyError::validation("empty identifier segment"));
    }
    Ok(IdentPart::Unquoted(name))
}
