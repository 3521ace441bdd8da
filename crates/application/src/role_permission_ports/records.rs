use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use confhub_domain::{PermissionId, PermissionType, RoleId};

/// Input payload for creating one permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermission {
    /// Permission kind.
    pub permission_type: PermissionType,
    /// Scope the permission applies to.
    pub target_id: String,
    /// Operator recorded as creator.
    pub created_by: String,
}

/// Persisted permission, unique by `(permission_type, target_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    /// Store-assigned identifier.
    pub permission_id: PermissionId,
    /// Permission kind.
    pub permission_type: PermissionType,
    /// Scope the permission applies to.
    pub target_id: String,
    /// Operator recorded as creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input payload for creating one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Globally unique role name.
    pub role_name: String,
    /// Operator recorded as creator.
    pub created_by: String,
}

/// Persisted role with its fixed permission bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Store-assigned identifier.
    pub role_id: RoleId,
    /// Globally unique role name.
    pub role_name: String,
    /// Permissions bundled at creation time.
    pub permission_ids: BTreeSet<PermissionId>,
    /// Operator recorded as creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a user holding a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignmentRecord {
    /// Assigned role name.
    pub role_name: String,
    /// User holding the role.
    pub user_id: String,
    /// Operator who performed the grant.
    pub assigned_by: String,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}
