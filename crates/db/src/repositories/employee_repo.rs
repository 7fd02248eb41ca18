//! Repository for the `employees` table.

use roster_core::pagination::PageRequest;
use roster_core::sorting::SortSpec;
use roster_core::types::DbId;
use sqlx::PgPool;

use crate::models::employee::{CreateEmployee, Employee, EmployeeFilter, UpdateEmployee};
use crate::repositories::begin_snapshot;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, age, position, company_id";

/// Filter shared by the page query and its count query, so the reported
/// total always describes the same set the page was cut from.
///
/// `$1` company, `$2`/`$3` age bounds, `$4` optional name pattern.
const LIST_FILTER: &str = "company_id = $1 \
     AND age BETWEEN $2 AND $3 \
     AND ($4::text IS NULL OR name ILIKE $4)";

/// Provides CRUD and paged listing for employees. All lookups are scoped to
/// the owning company.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee under `company_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateEmployee,
    ) -> Result<Employee, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, company_id, input).await
    }

    /// Insert on an existing connection (used inside company transactions).
    pub(crate) async fn insert(
        conn: &mut sqlx::PgConnection,
        company_id: DbId,
        input: &CreateEmployee,
    ) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (name, age, position, company_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.position)
            .bind(company_id)
            .fetch_one(conn)
            .await
    }

    /// Find an employee of a given company by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM employees WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch one page of a company's employees plus the filtered total.
    ///
    /// Ordering comes from the whitelisted `sort` with `id` as a final
    /// tiebreaker so consecutive pages never overlap.
    pub async fn list_page(
        pool: &PgPool,
        company_id: DbId,
        filter: &EmployeeFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> Result<(Vec<Employee>, i64), sqlx::Error> {
        let pattern = filter.name_pattern();

        let mut tx = begin_snapshot(pool).await?;
        let count_query = format!("SELECT COUNT(*) FROM employees WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.min_age)
            .bind(filter.max_age)
            .bind(&pattern)
            .fetch_one(&mut *tx)
            .await?;

        let page_query = format!(
            "SELECT {COLUMNS} FROM employees
             WHERE {LIST_FILTER}
             ORDER BY {}, id ASC
             LIMIT $5 OFFSET $6",
            sort.to_sql()
        );
        let items = sqlx::query_as::<_, Employee>(&page_query)
            .bind(company_id)
            .bind(filter.min_age)
            .bind(filter.max_age)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(
            %company_id,
            total,
            returned = items.len(),
            page = page.page_number,
            "Listed employees"
        );
        Ok((items, total))
    }

    /// Replace an employee's fields.
    ///
    /// Returns `None` if the employee does not exist under `company_id`.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateEmployee,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET name = $3, age = $4, position = $5
             WHERE id = $1 AND company_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(company_id)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.position)
            .fetch_optional(pool)
            .await
    }

    /// Persist a tracked (already merged) employee.
    ///
    /// Fails with `RowNotFound` if the row vanished since it was loaded.
    pub async fn save(pool: &PgPool, employee: &Employee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET name = $3, age = $4, position = $5
             WHERE id = $1 AND company_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(employee.id)
            .bind(employee.company_id)
            .bind(&employee.name)
            .bind(employee.age)
            .bind(&employee.position)
            .fetch_one(pool)
            .await
    }

    /// Delete an employee. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
