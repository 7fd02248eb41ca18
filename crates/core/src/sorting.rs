//! Client sort order (`?order_by=name desc,age`).
//!
//! Like field selection, sort parsing never fails: unknown fields and
//! unrecognised directions are ignored. Only names from the caller's
//! whitelist survive, so the rendered clause is safe to splice into SQL.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortClause {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// An ordered list of whitelisted sort clauses. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    clauses: Vec<SortClause>,
}

impl SortSpec {
    /// Parse a comma-separated `field [asc|desc]` list.
    ///
    /// Field names are matched case-insensitively against `sortable` and
    /// reported with the whitelisted spelling. A field that appears twice
    /// keeps its first clause. If nothing usable remains, sorts by
    /// `default_field` ascending.
    pub fn parse(
        order_by: Option<&str>,
        sortable: &[&'static str],
        default_field: &'static str,
    ) -> Self {
        let mut clauses: Vec<SortClause> = Vec::new();

        for part in order_by.unwrap_or_default().split(',') {
            let mut words = part.split_whitespace();
            let Some(name) = words.next() else {
                continue;
            };
            let Some(field) = sortable
                .iter()
                .copied()
                .find(|candidate| candidate.eq_ignore_ascii_case(name))
            else {
                continue;
            };
            if clauses.iter().any(|c| c.field == field) {
                continue;
            }
            let direction = match words.next() {
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            clauses.push(SortClause { field, direction });
        }

        if clauses.is_empty() {
            clauses.push(SortClause {
                field: default_field,
                direction: SortDirection::Asc,
            });
        }
        Self { clauses }
    }

    pub fn clauses(&self) -> &[SortClause] {
        &self.clauses
    }

    /// Render as the body of an SQL `ORDER BY` (without the keyword).
    pub fn to_sql(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!("{} {}", c.field, c.direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[&str] = &["name", "age", "position"];

    fn parse(order_by: &str) -> SortSpec {
        SortSpec::parse(Some(order_by), SORTABLE, "name")
    }

    #[test]
    fn empty_input_sorts_by_default_field() {
        assert_eq!(SortSpec::parse(None, SORTABLE, "name").to_sql(), "name ASC");
        assert_eq!(parse("   ").to_sql(), "name ASC");
    }

    #[test]
    fn directions_and_order_are_kept() {
        assert_eq!(parse("age desc, name").to_sql(), "age DESC, name ASC");
    }

    #[test]
    fn names_and_directions_are_case_insensitive() {
        assert_eq!(parse("AGE DESC,Position").to_sql(), "age DESC, position ASC");
    }

    #[test]
    fn unknown_fields_and_directions_are_ignored() {
        assert_eq!(parse("salary desc, age sideways").to_sql(), "age ASC");
        assert_eq!(parse("id; DROP TABLE employees").to_sql(), "name ASC");
    }

    #[test]
    fn repeated_field_keeps_first_clause() {
        let spec = parse("age desc,age asc");
        assert_eq!(spec.clauses().len(), 1);
        assert_eq!(spec.clauses()[0].direction, SortDirection::Desc);
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(parse("Name DESC").to_sql(), "name DESC");
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
    }
}
