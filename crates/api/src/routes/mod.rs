pub mod company;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /companies                                       list, create
/// /companies/collection                            create many
/// /companies/collection/{ids}                      get many
/// /companies/{id}                                  get, update, delete
/// /companies/{id}/employees                       list, create
/// /companies/{id}/employees/{employee_id}         get, update, patch, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/companies", company::router())
}
