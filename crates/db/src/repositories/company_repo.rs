//! Repository for the `companies` table.

use roster_core::pagination::PageRequest;
use roster_core::sorting::SortSpec;
use roster_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::{Company, CreateCompany, UpdateCompany};
use crate::repositories::{begin_snapshot, EmployeeRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, address, country";

/// Provides CRUD and paged listing for companies.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a new company together with any initial employees, in one
    /// transaction.
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let company = Self::insert_with_employees(&mut tx, input).await?;
        tx.commit().await?;
        Ok(company)
    }

    /// Insert several companies atomically: either all are created or none.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateCompany],
    ) -> Result<Vec<Company>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(Self::insert_with_employees(&mut tx, input).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn insert_with_employees(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateCompany,
    ) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (name, address, country)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let company = sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.country)
            .fetch_one(&mut **tx)
            .await?;

        for employee in &input.employees {
            EmployeeRepo::insert(&mut **tx, company.id, employee).await?;
        }
        Ok(company)
    }

    /// Find a company by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a company with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Find all companies whose ID is in `ids`, ordered by name.
    ///
    /// Missing IDs are simply absent from the result.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Company>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM companies WHERE id = ANY($1) ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, Company>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Fetch one page of companies plus the total count.
    pub async fn list_page(
        pool: &PgPool,
        sort: &SortSpec,
        page: PageRequest,
    ) -> Result<(Vec<Company>, i64), sqlx::Error> {
        let mut tx = begin_snapshot(pool).await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM companies
             ORDER BY {}, id ASC
             LIMIT $1 OFFSET $2",
            sort.to_sql()
        );
        let items = sqlx::query_as::<_, Company>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(total, returned = items.len(), page = page.page_number, "Listed companies");
        Ok((items, total))
    }

    /// Replace a company's fields.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCompany,
    ) -> Result<Option<Company>, sqlx::Error> {
        let query = format!(
            "UPDATE companies SET name = $2, address = $3, country = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.country)
            .fetch_optional(pool)
            .await
    }

    /// Delete a company and, through the foreign key cascade, its employees.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
