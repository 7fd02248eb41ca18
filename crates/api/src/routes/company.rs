//! Route definitions for the `/companies` resource.
//!
//! Also nests employee routes under `/companies/{id}/employees`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{company, employee};
use crate::state::AppState;

/// Routes mounted at `/companies`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// POST   /collection                        -> create_collection
/// GET    /collection/{ids}                  -> get_collection
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// GET    /{id}/employees                    -> employee::list_by_company
/// POST   /{id}/employees                    -> employee::create
/// GET    /{id}/employees/{employee_id}      -> employee::get_by_id
/// PUT    /{id}/employees/{employee_id}      -> employee::update
/// PATCH  /{id}/employees/{employee_id}      -> employee::patch
/// DELETE /{id}/employees/{employee_id}      -> employee::delete
/// ```
pub fn router() -> Router<AppState> {
    let employee_routes = Router::new()
        .route("/", get(employee::list_by_company).post(employee::create))
        .route(
            "/{employee_id}",
            get(employee::get_by_id)
                .put(employee::update)
                .patch(employee::patch)
                .delete(employee::delete),
        );

    Router::new()
        .route("/", get(company::list).post(company::create))
        .route("/collection", post(company::create_collection))
        .route("/collection/{ids}", get(company::get_collection))
        .route(
            "/{id}",
            get(company::get_by_id)
                .put(company::update)
                .delete(company::delete),
        )
        // Segment name must match the `/{id}` routes above.
        .nest("/{id}/employees", employee_routes)
}
