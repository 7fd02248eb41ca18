//! Shared query parameter types for API handlers.
//!
//! Names are snake_case with camelCase aliases. Pagination numbers are parsed
//! leniently: anything that is not an integer counts as absent and falls back
//! to the server default instead of failing the request.

use std::num::IntErrorKind;

use roster_core::field_selection::FieldSelection;
use roster_core::pagination::PageRequest;
use roster_core::sorting::SortSpec;
use roster_db::models::company::{COMPANY_DEFAULT_SORT, COMPANY_SORTABLE};
use roster_db::models::employee::{EmployeeFilter, EMPLOYEE_DEFAULT_SORT, EMPLOYEE_SORTABLE};
use serde::{Deserialize, Deserializer};

/// Deserialize an optional integer, treating unparseable input as absent.
///
/// Integers too large for `i64` saturate, so they are still clamped by
/// [`PageRequest::normalize`] instead of falling back to the default.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }))
}

/// Field selection only (`?fields=`), for single-entity reads.
#[derive(Debug, Default, Deserialize)]
pub struct FieldsParams {
    pub fields: Option<String>,
}

impl FieldsParams {
    pub fn selection(&self) -> FieldSelection {
        FieldSelection::parse(self.fields.as_deref())
    }
}

/// Paging, ordering and field selection for company listings.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyListParams {
    #[serde(default, alias = "pageNumber", deserialize_with = "lenient_i64")]
    pub page_number: Option<i64>,
    #[serde(default, alias = "pageSize", deserialize_with = "lenient_i64")]
    pub page_size: Option<i64>,
    #[serde(alias = "orderBy")]
    pub order_by: Option<String>,
    pub fields: Option<String>,
}

impl CompanyListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::normalize(self.page_number, self.page_size)
    }

    pub fn sort(&self) -> SortSpec {
        SortSpec::parse(self.order_by.as_deref(), COMPANY_SORTABLE, COMPANY_DEFAULT_SORT)
    }

    pub fn selection(&self) -> FieldSelection {
        FieldSelection::parse(self.fields.as_deref())
    }
}

/// Paging, filtering, searching, ordering and field selection for employee
/// listings.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListParams {
    #[serde(default, alias = "pageNumber", deserialize_with = "lenient_i64")]
    pub page_number: Option<i64>,
    #[serde(default, alias = "pageSize", deserialize_with = "lenient_i64")]
    pub page_size: Option<i64>,
    #[serde(alias = "minAge")]
    pub min_age: Option<i32>,
    #[serde(alias = "maxAge")]
    pub max_age: Option<i32>,
    #[serde(alias = "searchTerm")]
    pub search_term: Option<String>,
    #[serde(alias = "orderBy")]
    pub order_by: Option<String>,
    pub fields: Option<String>,
}

impl EmployeeListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::normalize(self.page_number, self.page_size)
    }

    pub fn filter(&self) -> EmployeeFilter {
        let defaults = EmployeeFilter::default();
        EmployeeFilter {
            min_age: self.min_age.unwrap_or(defaults.min_age),
            max_age: self.max_age.unwrap_or(defaults.max_age),
            search_term: self.search_term.clone(),
        }
    }

    pub fn sort(&self) -> SortSpec {
        SortSpec::parse(self.order_by.as_deref(), EMPLOYEE_SORTABLE, EMPLOYEE_DEFAULT_SORT)
    }

    pub fn selection(&self) -> FieldSelection {
        FieldSelection::parse(self.fields.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use roster_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    use super::*;

    fn parse<T: for<'de> Deserialize<'de>>(query: &str) -> T {
        axum::extract::Query::<T>::try_from_uri(&format!("/x?{query}").parse().unwrap())
            .unwrap()
            .0
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let params: EmployeeListParams =
            parse("pageNumber=2&pageSize=5&minAge=20&maxAge=30&searchTerm=sam&orderBy=age%20desc");
        assert_eq!(params.page_number, Some(2));
        assert_eq!(params.page_size, Some(5));
        assert_eq!(params.filter().min_age, 20);
        assert_eq!(params.filter().max_age, 30);
        assert_eq!(params.search_term.as_deref(), Some("sam"));
        assert_eq!(params.sort().to_sql(), "age DESC");
    }

    #[test]
    fn unparseable_page_numbers_fall_back_to_defaults() {
        let params: CompanyListParams = parse("page_number=abc&page_size=");
        assert_eq!(params.page_request(), PageRequest::default());
    }

    #[test]
    fn oversized_page_size_is_clamped() {
        let params: CompanyListParams = parse("page_number=-5&page_size=999999");
        let request = params.page_request();
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn page_values_beyond_i64_saturate_before_clamping() {
        let params: CompanyListParams =
            parse("page_number=-99999999999999999999&page_size=99999999999999999999");
        let request = params.page_request();
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, MAX_PAGE_SIZE);

        let params: CompanyListParams = parse("page_number=99999999999999999999&page_size=10");
        assert_eq!(params.page_request().page_number, i64::MAX);
    }

    #[test]
    fn missing_params_use_defaults() {
        let params: EmployeeListParams = parse("");
        assert_eq!(params.page_request().page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(params.filter(), EmployeeFilter::default());
        assert!(params.selection().is_empty());
    }
}
