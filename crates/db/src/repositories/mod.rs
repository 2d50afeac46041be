//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod automation_rule_repo;
pub mod form_repo;
pub mod lifecycle_repo;
pub mod member_repo;
pub mod submission_repo;

pub use automation_rule_repo::AutomationRuleRepo;
pub use form_repo::FormRepo;
pub use lifecycle_repo::LifecycleRepo;
pub use member_repo::MemberRepo;
pub use submission_repo::SubmissionRepo;
