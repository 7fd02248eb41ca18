//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod company_repo;
pub mod employee_repo;

pub use company_repo::CompanyRepo;
pub use employee_repo::EmployeeRepo;

use sqlx::{PgPool, Postgres, Transaction};

/// Open a read-only transaction that sees one snapshot for all its
/// statements, so a count and the page it describes agree.
pub(crate) async fn begin_snapshot(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
