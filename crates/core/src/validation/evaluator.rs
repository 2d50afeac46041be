//! Validation engine.

use super::rules::{FieldViolation, ValidationResult};
use crate::designer::ElementTree;
use crate::fields::attributes::is_blank;
use crate::fields::registry;
use crate::fill::SubmissionValues;

/// Validate collected values against every field of `tree`, in tree order.
///
/// A field with no collected value is checked against `""`. Values keyed by
/// ids that are not in the tree are ignored here.
pub fn validate_submission(tree: &ElementTree, values: &SubmissionValues) -> ValidationResult {
    let errors = tree
        .iter()
        .filter_map(|field| {
            let raw = values.get(&field.id).map(String::as_str).unwrap_or("");
            if registry::validate(field, raw) {
                return None;
            }
            let label = field.display_label();
            let message = if field.is_required() && is_blank(raw) {
                format!("{label} is required")
            } else {
                format!("{label} has an invalid value")
            };
            Some(FieldViolation {
                field_id: field.id.clone(),
                field_type: field.field_type,
                message,
            })
        })
        .collect();
    ValidationResult::from_errors(errors)
}
