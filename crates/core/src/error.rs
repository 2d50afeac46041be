use crate::types::DbId;
use crate::validation::rules::FieldViolation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Form {0} is not published")]
    NotPublished(DbId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Submission rejected: {} field(s) failed validation", .0.len())]
    FieldValidation(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Ids of the fields that failed validation, empty for every other variant.
    pub fn failing_field_ids(&self) -> Vec<&str> {
        match self {
            Self::FieldValidation(violations) => {
                violations.iter().map(|v| v.field_id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}
