//! Client field selection (`?fields=name,age`).
//!
//! Parsing is deliberately forgiving: any input produces a (possibly empty)
//! selection and never an error. An empty selection means "use the default
//! field set" to the shaper.

use std::fmt;

use indexmap::IndexMap;

/// An ordered, case-insensitively unique set of requested field names.
///
/// The first-seen spelling of each name is kept; later duplicates that only
/// differ by case are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    /// Lower-cased name -> first-seen spelling.
    fields: IndexMap<String, String>,
}

impl FieldSelection {
    /// Parse a comma-separated field specification.
    ///
    /// `None`, empty and whitespace-only input all yield an empty selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_core::field_selection::FieldSelection;
    /// let fields = FieldSelection::parse(Some(" Name, age ,name,,"));
    /// assert_eq!(fields.to_string(), "Name,age");
    /// assert!(FieldSelection::parse(None).is_empty());
    /// ```
    pub fn parse(spec: Option<&str>) -> Self {
        let mut fields = IndexMap::new();
        for name in spec
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            fields
                .entry(name.to_lowercase())
                .or_insert_with(|| name.to_string());
        }
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_lowercase())
    }

    /// Requested names in first-seen order, with their original spelling.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }
}

/// Renders the selection back into its canonical comma-separated form.
impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
