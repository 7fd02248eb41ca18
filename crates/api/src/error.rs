use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_core::error::CoreError;
use serde::Serialize;
use serde_json::Value;

/// Error returned by every handler.
///
/// Domain failures arrive as [`CoreError`], persistence failures as
/// [`sqlx::Error`]; both are turned into a JSON body of the form
/// `{"error": ..., "code": ..., "details"?: ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed client input that never reached the domain layer.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::InvalidFields(errors))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ErrorBody {
    fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal error occurred")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Core(core) => core_error_parts(core),
            AppError::Database(err) => sqlx_error_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg)),
        };
        (status, Json(body)).into_response()
    }
}

fn core_error_parts(err: &CoreError) -> (StatusCode, ErrorBody) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{entity} with id {id} not found")),
        ),
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("VALIDATION_ERROR", msg),
        ),
        CoreError::InvalidFields(errors) => {
            let mut body = ErrorBody::new("INVALID_FIELDS", "One or more fields failed validation");
            body.details = serde_json::to_value(errors).ok();
            (StatusCode::UNPROCESSABLE_ENTITY, body)
        }
        CoreError::Patch(patch) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("INVALID_PATCH", patch.to_string()),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new("CONFLICT", msg)),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}

/// Map a sqlx error onto a response.
///
/// Missing rows and foreign-key violations (a parent row that is gone) become
/// 404, unique violations 409. Anything else is logged and hidden behind a 500.
fn sqlx_error_parts(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", "Resource not found"),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::CONFLICT,
                    ErrorBody::new("CONFLICT", format!("Duplicate value violates {constraint}")),
                );
            }
            Some("23503") => {
                return (
                    StatusCode::NOT_FOUND,
                    ErrorBody::new("NOT_FOUND", "Referenced resource not found"),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
}
