//! Handlers for employees, nested under `/companies/{id}/employees`.

use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use roster_core::error::CoreError;
use roster_core::pagination::PagedList;
use roster_core::patch::{merge_patch, PatchDocument};
use roster_core::shaping::{shape_one, DataShaper, ShapedRecord};
use roster_core::types::DbId;
use roster_db::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use roster_db::repositories::{CompanyRepo, EmployeeRepo};
use roster_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::{EmployeeListParams, FieldsParams};
use crate::response::Paginated;
use crate::state::AppState;

/// Fail with 404 unless the owning company exists.
async fn ensure_company_exists(pool: &DbPool, company_id: DbId) -> AppResult<()> {
    if CompanyRepo::exists(pool, company_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id: company_id,
        }))
    }
}

/// Load an employee of `company_id`, distinguishing a missing company from a
/// missing employee.
async fn find_employee(pool: &DbPool, company_id: DbId, id: DbId) -> AppResult<Employee> {
    ensure_company_exists(pool, company_id).await?;
    EmployeeRepo::find_by_id(pool, company_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))
}

/// GET /api/v1/companies/{id}/employees
///
/// The age range is checked before anything touches the database.
pub async fn list_by_company(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
    Query(params): Query<EmployeeListParams>,
) -> AppResult<Paginated<ShapedRecord>> {
    let filter = params.filter();
    if !filter.has_valid_age_range() {
        return Err(AppError::Core(CoreError::Validation(
            "max_age can't be less than min_age".to_string(),
        )));
    }

    ensure_company_exists(&state.pool, company_id).await?;

    let page = params.page_request();
    tracing::debug!(%company_id, ?params, ?page, "Listing employees");
    let (items, total) =
        EmployeeRepo::list_page(&state.pool, company_id, &filter, &params.sort(), page).await?;

    let shaper = DataShaper::<Employee>::resolve(&params.selection());
    let paged = PagedList::from_page(items, total, page).map(|e| shaper.shape_record(&e));
    Ok(Paginated(paged))
}

/// POST /api/v1/companies/{id}/employees
pub async fn create(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
    Json(input): Json<CreateEmployee>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<Employee>)> {
    input.validate()?;
    ensure_company_exists(&state.pool, company_id).await?;

    let employee = EmployeeRepo::create(&state.pool, company_id, &input).await?;
    tracing::info!(%company_id, employee_id = %employee.id, "Employee created");

    let location = format!("/api/v1/companies/{company_id}/employees/{}", employee.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(employee)))
}

/// GET /api/v1/companies/{id}/employees/{employee_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(DbId, DbId)>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<ShapedRecord>> {
    let employee = find_employee(&state.pool, company_id, id).await?;
    Ok(Json(shape_one(&employee, &params.selection())))
}

/// PUT /api/v1/companies/{id}/employees/{employee_id}
pub async fn update(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    input.validate()?;
    ensure_company_exists(&state.pool, company_id).await?;

    let employee = EmployeeRepo::update(&state.pool, company_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))?;
    tracing::info!(%company_id, employee_id = %id, "Employee updated");
    Ok(Json(employee))
}

/// PATCH /api/v1/companies/{id}/employees/{employee_id}
///
/// Body is a JSON Patch operation array targeting the employee's update
/// shape (`name`, `age`, `position`). The patch is applied and validated in
/// memory; nothing is written unless every step succeeds.
pub async fn patch(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(DbId, DbId)>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<Employee>> {
    let document = PatchDocument::from_value(body).map_err(CoreError::from)?;
    if document.is_empty() {
        return Err(AppError::BadRequest("Patch document is empty".to_string()));
    }

    let mut employee = find_employee(&state.pool, company_id, id).await?;
    if let Err(err) = merge_patch(&mut employee, &document) {
        tracing::info!(%company_id, employee_id = %id, error = %err, "Employee patch rejected");
        return Err(err.into());
    }

    let saved = EmployeeRepo::save(&state.pool, &employee).await?;
    tracing::info!(
        %company_id,
        employee_id = %id,
        operations = document.0.len(),
        "Employee patched"
    );
    Ok(Json(saved))
}

/// DELETE /api/v1/companies/{id}/employees/{employee_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_company_exists(&state.pool, company_id).await?;

    let deleted = EmployeeRepo::delete(&state.pool, company_id, id).await?;
    if deleted {
        tracing::info!(%company_id, employee_id = %id, "Employee deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))
    }
}
