//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the user behind a JWT Bearer token.
//! - [`rbac`]: organization-scoped role checks for forms and rules.

pub mod auth;
pub mod rbac;
