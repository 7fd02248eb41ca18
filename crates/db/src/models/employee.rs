//! Employee entity model, DTOs and list filter.

use roster_core::pagination::valid_range;
use roster_core::patch::TransferShape;
use roster_core::shapeable;
use roster_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Columns an employee listing may be ordered by.
pub const EMPLOYEE_SORTABLE: &[&str] = &["name", "age", "position"];

/// Default ordering column for employee listings.
pub const EMPLOYEE_DEFAULT_SORT: &str = "name";

/// An employee row from the `employees` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub company_id: DbId,
}

shapeable!(Employee {
    id,
    name,
    age,
    position,
    company_id
});

/// DTO for creating a new employee. The owning company comes from the route.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateEmployee {
    #[validate(length(min = 1, max = 30, message = "Employee name is required (max 30 characters)"))]
    pub name: String,
    #[validate(range(min = 18, max = 120, message = "Age must be between 18 and 120"))]
    pub age: i32,
    #[validate(length(min = 1, max = 20, message = "Position is required (max 20 characters)"))]
    pub position: String,
}

/// DTO for replacing an employee's fields; also the shape patch documents
/// are applied to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 30, message = "Employee name is required (max 30 characters)"))]
    pub name: String,
    #[validate(range(min = 18, max = 120, message = "Age must be between 18 and 120"))]
    pub age: i32,
    #[validate(length(min = 1, max = 20, message = "Position is required (max 20 characters)"))]
    pub position: String,
}

impl TransferShape for Employee {
    type Transfer = UpdateEmployee;

    fn to_transfer(&self) -> UpdateEmployee {
        UpdateEmployee {
            name: self.name.clone(),
            age: self.age,
            position: self.position.clone(),
        }
    }

    fn apply_transfer(&mut self, transfer: UpdateEmployee) {
        self.name = transfer.name;
        self.age = transfer.age;
        self.position = transfer.position;
    }
}

/// Row filter for employee listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub min_age: i32,
    pub max_age: i32,
    /// Case-insensitive substring match on the name.
    pub search_term: Option<String>,
}

impl Default for EmployeeFilter {
    fn default() -> Self {
        Self {
            min_age: 0,
            max_age: i32::MAX,
            search_term: None,
        }
    }
}

impl EmployeeFilter {
    pub fn has_valid_age_range(&self) -> bool {
        valid_range(self.min_age, self.max_age)
    }

    /// The `ILIKE` pattern for the search term, with wildcards escaped.
    pub fn name_pattern(&self) -> Option<String> {
        let term = self.search_term.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }
}
