//! Company entity model and DTOs.

use roster_core::shapeable;
use roster_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::employee::CreateEmployee;

/// Columns a company listing may be ordered by.
pub const COMPANY_SORTABLE: &[&str] = &["name", "address", "country"];

/// Default ordering column for company listings.
pub const COMPANY_DEFAULT_SORT: &str = "name";

/// A company row from the `companies` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub country: String,
}

shapeable!(Company {
    id,
    name,
    address,
    country
});

/// DTO for creating a company, optionally with its initial employees.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCompany {
    #[validate(length(min = 1, max = 60, message = "Company name is required (max 60 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 60, message = "Address is required (max 60 characters)"))]
    pub address: String,
    #[validate(length(min = 1, max = 30, message = "Country is required (max 30 characters)"))]
    pub country: String,
    #[serde(default)]
    #[validate(nested)]
    pub employees: Vec<CreateEmployee>,
}

/// DTO for replacing a company's fields.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCompany {
    #[validate(length(min = 1, max = 60, message = "Company name is required (max 60 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 60, message = "Address is required (max 60 characters)"))]
    pub address: String,
    #[validate(length(min = 1, max = 30, message = "Country is required (max 30 characters)"))]
    pub country: String,
}
