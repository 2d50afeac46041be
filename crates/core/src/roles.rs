//! Organization roles and the permissions they grant on forms.
//!
//! Role names must match the values stored in `organization_members.role`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

/// A member's role inside one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => ROLE_OWNER,
            Self::Admin => ROLE_ADMIN,
            Self::Editor => ROLE_EDITOR,
            Self::Viewer => ROLE_VIEWER,
        }
    }

    /// Whether this role grants the given permission.
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => true,
            Permission::Edit => matches!(self, Self::Owner | Self::Admin | Self::Editor),
            Permission::Publish => matches!(self, Self::Owner | Self::Admin),
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_OWNER => Ok(Self::Owner),
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_EDITOR => Ok(Self::Editor),
            ROLE_VIEWER => Ok(Self::Viewer),
            _ => Err(CoreError::Validation(format!(
                "Invalid role: '{s}'. Must be one of: owner, admin, editor, viewer"
            ))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations gated by organization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// View forms, rules and submissions.
    Read,
    /// Change form content and automation rules.
    Edit,
    /// Publish a form (one-way).
    Publish,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Edit => "edit",
            Self::Publish => "publish",
        }
    }
}

/// Check a (possibly absent) membership role against a permission.
///
/// Non-members are rejected the same way as insufficient roles so that
/// callers fail closed before touching any state.
pub fn authorize(role: Option<Role>, permission: Permission) -> Result<Role, CoreError> {
    match role {
        Some(role) if role.allows(permission) => Ok(role),
        Some(role) => Err(CoreError::Forbidden(format!(
            "Role '{role}' may not {} forms",
            permission.as_str()
        ))),
        None => Err(CoreError::Forbidden(
            "Not a member of this organization".to_string(),
        )),
    }
}
