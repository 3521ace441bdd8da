use std::collections::BTreeSet;

use async_trait::async_trait;

use confhub_core::AppResult;
use confhub_domain::{PermissionId, PermissionType};

use super::records::{NewPermission, NewRole, PermissionRecord, RoleAssignmentRecord, RoleRecord};

/// Repository port for roles, permissions and role assignments.
///
/// Implementations enforce uniqueness of role names and of permission
/// `(permission_type, target_id)` pairs and report violations as
/// [`confhub_core::AppError::Conflict`].
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Finds a role by its exact name.
    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>>;

    /// Finds a permission by its identity.
    async fn find_permission(
        &self,
        permission_type: PermissionType,
        target_id: &str,
    ) -> AppResult<Option<PermissionRecord>>;

    /// Creates one permission.
    async fn create_permission(&self, permission: NewPermission) -> AppResult<PermissionRecord>;

    /// Creates several permissions atomically.
    async fn create_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> AppResult<Vec<PermissionRecord>>;

    /// Creates a role bundling existing permissions atomically.
    async fn create_role_with_permissions(
        &self,
        role: NewRole,
        permission_ids: BTreeSet<PermissionId>,
    ) -> AppResult<RoleRecord>;

    /// Grants a role to users and returns the assignments that were newly recorded.
    async fn assign_role_to_users(
        &self,
        role_name: &str,
        user_ids: &BTreeSet<String>,
        operator: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>>;

    /// Lists users holding a role, ordered by user id.
    async fn list_role_assignments(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>>;
}
