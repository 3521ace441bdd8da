use sqlx::{Executor, Postgres};

use super::*;

const INSERT_PERMISSION: &str = r#"
    INSERT INTO rbac_permissions (id, permission_type, target_id, created_by)
    VALUES ($1, $2, $3, $4)
    RETURNING id, permission_type, target_id, created_by, created_at
"#;

async fn insert_permission<'e, E>(
    executor: E,
    permission: NewPermission,
) -> AppResult<PermissionRecord>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PermissionRow>(INSERT_PERMISSION)
        .bind(PermissionId::new().as_uuid())
        .bind(permission.permission_type.as_str())
        .bind(permission.target_id.as_str())
        .bind(permission.created_by.as_str())
        .fetch_one(executor)
        .await
        .map_err(|error| {
            map_permission_conflict(
                error,
                permission.permission_type,
                permission.target_id.as_str(),
            )
        })?;

    PermissionRecord::try_from(row)
}

impl PostgresRolePermissionRepository {
    pub(super) async fn find_permission_impl(
        &self,
        permission_type: PermissionType,
        target_id: &str,
    ) -> AppResult<Option<PermissionRecord>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, permission_type, target_id, created_by, created_at
            FROM rbac_permissions
            WHERE permission_type = $1 AND target_id = $2
            "#,
        )
        .bind(permission_type.as_str())
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find permission '{permission_type}' on '{target_id}': {error}"
            ))
        })?;

        row.map(PermissionRecord::try_from).transpose()
    }

    pub(super) async fn create_permission_impl(
        &self,
        permission: NewPermission,
    ) -> AppResult<PermissionRecord> {
        insert_permission(&self.pool, permission).await
    }

    pub(super) async fn create_permissions_impl(
        &self,
        permissions: Vec<NewPermission>,
    ) -> AppResult<Vec<PermissionRecord>> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let mut created = Vec::with_capacity(permissions.len());
        for permission in permissions {
            created.push(insert_permission(&mut *transaction, permission).await?);
        }

        transaction.commit().await.map_err(commit_error)?;

        Ok(created)
    }
}
