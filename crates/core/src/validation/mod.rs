//! Submission validation: every field of the tree is checked against the
//! value collected for it, from scratch on each attempt.

pub mod evaluator;
pub mod rules;

pub use evaluator::validate_submission;
pub use rules::{FieldViolation, ValidationResult};
