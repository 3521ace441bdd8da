use super::*;

impl PostgresRolePermissionRepository {
    pub(super) async fn find_role_by_name_impl(
        &self,
        role_name: &str,
    ) -> AppResult<Option<RoleRecord>> {
        let Some(row) = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, created_by, created_at
            FROM rbac_roles
            WHERE name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find role '{role_name}': {error}"))
        })?
        else {
            return Ok(None);
        };

        let permission_ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT permission_id
            FROM rbac_role_permissions
            WHERE role_id = $1
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permissions for role '{role_name}': {error}"
            ))
        })?
        .into_iter()
        .map(PermissionId::from_uuid)
        .collect();

        Ok(Some(role_record(row, permission_ids)))
    }

    pub(super) async fn create_role_with_permissions_impl(
        &self,
        role: NewRole,
        permission_ids: BTreeSet<PermissionId>,
    ) -> AppResult<RoleRecord> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO rbac_roles (id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(RoleId::new().as_uuid())
        .bind(role.role_name.as_str())
        .bind(role.created_by.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, role.role_name.as_str()))?;

        for permission_id in &permission_ids {
            sqlx::query(
                r#"
                INSERT INTO rbac_role_permissions (role_id, permission_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(row.id)
            .bind(permission_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    return AppError::NotFound(format!(
                        "permission '{permission_id}' was not found"
                    ));
                }

                AppError::Internal(format!(
                    "failed to bind permission '{permission_id}' to role '{}': {error}",
                    role.role_name
                ))
            })?;
        }

        transaction.commit().await.map_err(commit_error)?;

        Ok(role_record(row, permission_ids))
    }
}
