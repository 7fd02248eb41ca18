use crate::patch::PatchError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Client input that is rejected outright (invalid range filter, bad id list).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A transfer shape that failed its field-level validation rules.
    #[error("Invalid fields: {0}")]
    InvalidFields(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
