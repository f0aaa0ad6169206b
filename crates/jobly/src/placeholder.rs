//! Positional placeholder numbering (`$1, $2, ...`).

use std::fmt;

/// A 1-based positional parameter marker, rendered as `$n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Placeholder(usize);

impl Placeholder {
    /// The 1-based index of this placeholder.
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn write_sql(self, out: &mut String) {
        use fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(out, "${}", self.0);
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Hands out contiguous placeholders in issue order.
///
/// A counter is shared by every clause of one statement, so clauses that bind
/// a value advance it and clauses that don't (e.g. `equity > 0`) leave it alone.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    issued: usize,
    offset: usize,
}

impl Placeholders {
    /// Start numbering at `$1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `$(offset + 1)`, continuing a statement that
    /// already bound `offset` values.
    pub fn starting_after(offset: usize) -> Self {
        Self { issued: 0, offset }
    }

    /// Issue the next placeholder.
    pub fn issue(&mut self) -> Placeholder {
        self.issued += 1;
        Placeholder(self.offset + self.issued)
    }

    /// The placeholder that would be issued next, without consuming it.
    pub fn peek(&self) -> Placeholder {
        Placeholder(self.offset + self.issued + 1)
    }

    /// Number of placeholders issued by this counter.
    pub fn count(&self) -> usize {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_contiguous_from_one() {
        let mut p = Placeholders::new();
        assert_eq!(p.issue().to_string(), "$1");
        assert_eq!(p.issue().to_string(), "$2");
        assert_eq!(p.peek().to_string(), "$3");
        assert_eq!(p.count(), 2);
    }

    #[test]
    fn offset_continues_an_existing_statement() {
        let mut p = Placeholders::starting_after(3);
        assert_eq!(p.issue().index(), 4);
        assert_eq!(p.count(), 1);
    }

    #[test]
    fn write_sql_matches_display() {
        let mut out = String::from("id = ");
        Placeholder(12).write_sql(&mut out);
        assert_eq!(out, "id = $12");
    }
}
