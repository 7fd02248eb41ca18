//! Handlers for the `/companies` resource.

use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::Json;
use roster_core::error::CoreError;
use roster_core::pagination::PagedList;
use roster_core::shaping::{shape_one, DataShaper, ShapedRecord};
use roster_core::types::DbId;
use roster_db::models::company::{Company, CreateCompany, UpdateCompany};
use roster_db::repositories::CompanyRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::{CompanyListParams, FieldsParams};
use crate::response::Paginated;
use crate::state::AppState;

/// Parse a comma-separated list of company IDs from a path segment.
pub fn parse_id_list(raw: &str) -> AppResult<Vec<DbId>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| AppError::BadRequest(format!("'{s}' is not a valid id")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(AppError::BadRequest("Id list is empty".to_string()));
    }
    Ok(ids)
}

/// GET /api/v1/companies
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CompanyListParams>,
) -> AppResult<Paginated<ShapedRecord>> {
    let page = params.page_request();
    tracing::debug!(?params, ?page, "Listing companies");

    let (items, total) = CompanyRepo::list_page(&state.pool, &params.sort(), page).await?;

    let shaper = DataShaper::<Company>::resolve(&params.selection());
    let paged = PagedList::from_page(items, total, page).map(|c| shaper.shape_record(&c));
    Ok(Paginated(paged))
}

/// POST /api/v1/companies
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCompany>,
) -> AppResult<(StatusCode, [(axum::http::HeaderName, String); 1], Json<Company>)> {
    input.validate()?;

    let company = CompanyRepo::create(&state.pool, &input).await?;
    tracing::info!(
        company_id = %company.id,
        employees = input.employees.len(),
        "Company created"
    );

    let location = format!("/api/v1/companies/{}", company.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(company)))
}

/// GET /api/v1/companies/collection/{ids}
pub async fn get_collection(
    State(state): State<AppState>,
    Path(ids): Path<String>,
) -> AppResult<Json<Vec<Company>>> {
    let mut ids = parse_id_list(&ids)?;
    ids.sort_unstable();
    ids.dedup();

    let companies = CompanyRepo::find_by_ids(&state.pool, &ids).await?;
    if let Some(missing) = ids.iter().find(|id| !companies.iter().any(|c| c.id == **id)) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id: *missing,
        }));
    }
    Ok(Json(companies))
}

/// POST /api/v1/companies/collection
pub async fn create_collection(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<CreateCompany>>,
) -> AppResult<(StatusCode, Json<Vec<Company>>)> {
    if inputs.is_empty() {
        return Err(AppError::BadRequest(
            "Company collection is empty".to_string(),
        ));
    }
    for input in &inputs {
        input.validate()?;
    }

    let companies = CompanyRepo::create_many(&state.pool, &inputs).await?;
    tracing::info!(count = companies.len(), "Company collection created");
    Ok((StatusCode::CREATED, Json(companies)))
}

/// GET /api/v1/companies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<ShapedRecord>> {
    let company = CompanyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }))?;
    Ok(Json(shape_one(&company, &params.selection())))
}

/// PUT /api/v1/companies/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompany>,
) -> AppResult<Json<Company>> {
    input.validate()?;

    let company = CompanyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }))?;
    tracing::info!(company_id = %id, "Company updated");
    Ok(Json(company))
}

/// DELETE /api/v1/companies/{id}
///
/// Employees of the company are removed with it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = CompanyRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(company_id = %id, "Company deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }))
    }
}
