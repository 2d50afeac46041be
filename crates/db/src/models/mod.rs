//! Database row structs and their conversions into domain types.

pub mod automation_rule;
pub mod form;
pub mod member;
pub mod submission;
