use tracing::debug;

use super::*;

impl PostgresRolePermissionRepository {
    pub(super) async fn assign_role_to_users_impl(
        &self,
        role_name: &str,
        user_ids: &BTreeSet<String>,
        operator: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT id
            FROM rbac_roles
            WHERE name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' was not found")))?;

        let mut created = Vec::new();
        for user_id in user_ids {
            let row = sqlx::query_as::<_, RoleAssignmentRow>(
                r#"
                INSERT INTO rbac_user_roles (role_id, user_id, assigned_by)
                VALUES ($1, $2, $3)
                ON CONFLICT (role_id, user_id) DO NOTHING
                RETURNING $4::TEXT AS role_name, user_id, assigned_by, assigned_at
                "#,
            )
            .bind(role_id)
            .bind(user_id.as_str())
            .bind(operator)
            .bind(role_name)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to assign role '{role_name}' to user '{user_id}': {error}"
                ))
            })?;

            match row {
                Some(row) => created.push(RoleAssignmentRecord::from(row)),
                None => debug!(role_name, user_id, "role assignment already exists"),
            }
        }

        transaction.commit().await.map_err(commit_error)?;

        Ok(created)
    }

    pub(super) async fn list_role_assignments_impl(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                roles.name AS role_name,
                user_roles.user_id,
                user_roles.assigned_by,
                user_roles.assigned_at
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            WHERE roles.name = $1
            ORDER BY user_roles.user_id
            "#,
        )
        .bind(role_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list assignments for role '{role_name}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(RoleAssignmentRecord::from).collect())
    }
}
