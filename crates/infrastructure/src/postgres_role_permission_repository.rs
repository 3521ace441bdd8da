use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use confhub_application::{
    NewPermission, NewRole, PermissionRecord, RoleAssignmentRecord, RolePermissionRepository,
    RoleRecord,
};
use confhub_core::{AppError, AppResult};
use confhub_domain::{PermissionId, PermissionType, RoleId};

mod assignments;
mod permissions;
mod roles;

/// PostgreSQL-backed repository for roles, permissions, and user-role assignments.
#[derive(Clone)]
pub struct PostgresRolePermissionRepository {
    pool: PgPool,
}

impl PostgresRolePermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    permission_type: String,
    target_id: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    role_name: String,
    user_id: String,
    assigned_by: String,
    assigned_at: DateTime<Utc>,
}

impl TryFrom<PermissionRow> for PermissionRecord {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let permission_type =
            PermissionType::from_str(row.permission_type.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode permission type '{}' for permission '{}': {error}",
                    row.permission_type, row.id
                ))
            })?;

        Ok(Self {
            permission_id: PermissionId::from_uuid(row.id),
            permission_type,
            target_id: row.target_id,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

impl From<RoleAssignmentRow> for RoleAssignmentRecord {
    fn from(row: RoleAssignmentRow) -> Self {
        Self {
            role_name: row.role_name,
            user_id: row.user_id,
            assigned_by: row.assigned_by,
            assigned_at: row.assigned_at,
        }
    }
}

fn role_record(row: RoleRow, permission_ids: BTreeSet<PermissionId>) -> RoleRecord {
    RoleRecord {
        role_id: RoleId::from_uuid(row.id),
        role_name: row.name,
        permission_ids,
        created_by: row.created_by,
        created_at: row.created_at,
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23503")
    )
}

fn map_permission_conflict(
    error: sqlx::Error,
    permission_type: PermissionType,
    target_id: &str,
) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!(
            "permission '{permission_type}' on '{target_id}' already exists"
        ));
    }

    AppError::Internal(format!("failed to create permission: {error}"))
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to create role: {error}"))
}

fn begin_error(error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to begin transaction: {error}"))
}

fn commit_error(error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to commit transaction: {error}"))
}

#[async_trait]
impl RolePermissionRepository for PostgresRolePermissionRepository {
    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        self.find_role_by_name_impl(role_name).await
    }

    async fn find_permission(
        &self,
        permission_type: PermissionType,
        target_id: &str,
    ) -> AppResult<Option<PermissionRecord>> {
        self.find_permission_impl(permission_type, target_id).await
    }

    async fn create_permission(&self, permission: NewPermission) -> AppResult<PermissionRecord> {
        self.create_permission_impl(permission).await
    }

    async fn create_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> AppResult<Vec<PermissionRecord>> {
        self.create_permissions_impl(permissions).await
    }

    async fn create_role_with_permissions(
        &self,
        role: NewRole,
        permission_ids: BTreeSet<PermissionId>,
    ) -> AppResult<RoleRecord> {
        self.create_role_with_permissions_impl(role, permission_ids)
            .await
    }

    async fn assign_role_to_users(
        &self,
        role_name: &str,
        user_ids: &BTreeSet<String>,
        operator: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.assign_role_to_users_impl(role_name, user_ids, operator)
            .await
    }

    async fn list_role_assignments(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.list_role_assignments_impl(role_name).await
    }
}
