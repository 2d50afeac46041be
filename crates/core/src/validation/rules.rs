//! Validation result types.

use serde::{Deserialize, Serialize};

use crate::fields::FieldType;
use crate::types::FieldId;

/// Aggregated result of validating one submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldViolation>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Failing field ids in tree order.
    pub fn error_ids(&self) -> Vec<&str> {
        self.errors.iter().map(|v| v.field_id.as_str()).collect()
    }
}

/// A single field that rejected its submitted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field_id: FieldId,
    pub field_type: FieldType,
    pub message: String,
}
