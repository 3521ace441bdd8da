use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use confhub_application::{
    NewPermission, NewRole, PermissionRecord, RoleAssignmentRecord, RolePermissionRepository,
    RoleRecord,
};
use confhub_core::{AppError, AppResult};
use confhub_domain::{PermissionId, PermissionType, RoleId};
use tokio::sync::RwLock;

/// In-memory role and permission store with the same uniqueness rules as the database.
#[derive(Debug, Default)]
pub struct InMemoryRolePermissionRepository {
    roles: RwLock<HashMap<String, RoleRecord>>,
    permissions: RwLock<HashMap<(PermissionType, String), PermissionRecord>>,
    assignments: RwLock<BTreeMap<(String, String), RoleAssignmentRecord>>,
}

impl InMemoryRolePermissionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
            permissions: RwLock::new(HashMap::new()),
            assignments: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the number of stored roles.
    pub async fn role_count(&self) -> usize {
        self.roles.read().await.len()
    }

    /// Returns the number of stored permissions.
    pub async fn permission_count(&self) -> usize {
        self.permissions.read().await.len()
    }
}

fn build_permission_record(permission: NewPermission) -> PermissionRecord {
    PermissionRecord {
        permission_id: PermissionId::new(),
        permission_type: permission.permission_type,
        target_id: permission.target_id,
        created_by: permission.created_by,
        created_at: Utc::now(),
    }
}

fn permission_conflict(permission_type: PermissionType, target_id: &str) -> AppError {
    AppError::Conflict(format!(
        "permission '{permission_type}' on '{target_id}' already exists"
    ))
}

#[async_trait]
impl RolePermissionRepository for InMemoryRolePermissionRepository {
    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.roles.read().await.get(role_name).cloned())
    }

    async fn find_permission(
        &self,
        permission_type: PermissionType,
        target_id: &str,
    ) -> AppResult<Option<PermissionRecord>> {
        Ok(self
            .permissions
            .read()
            .await
            .get(&(permission_type, target_id.to_owned()))
            .cloned())
    }

    async fn create_permission(&self, permission: NewPermission) -> AppResult<PermissionRecord> {
        let key = (permission.permission_type, permission.target_id.clone());
        let mut permissions = self.permissions.write().await;

        if permissions.contains_key(&key) {
            return Err(permission_conflict(key.0, key.1.as_str()));
        }

        let record = build_permission_record(permission);
        permissions.insert(key, record.clone());
        Ok(record)
    }

    async fn create_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> AppResult<Vec<PermissionRecord>> {
        let mut stored = self.permissions.write().await;

        let mut batch_keys = BTreeSet::new();
        for permission in &permissions {
            let key = (permission.permission_type, permission.target_id.clone());
            if stored.contains_key(&key) || !batch_keys.insert(key) {
                return Err(permission_conflict(
                    permission.permission_type,
                    permission.target_id.as_str(),
                ));
            }
        }

        let mut created = Vec::with_capacity(permissions.len());
        for permission in permissions {
            let key = (permission.permission_type, permission.target_id.clone());
            let record = build_permission_record(permission);
            stored.insert(key, record.clone());
            created.push(record);
        }

        Ok(created)
    }

    async fn create_role_with_permissions(
        &self,
        role: NewRole,
        permission_ids: BTreeSet<PermissionId>,
    ) -> AppResult<RoleRecord> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(&role.role_name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.role_name
            )));
        }

        let permissions = self.permissions.read().await;
        if let Some(missing) = permission_ids.iter().find(|permission_id| {
            !permissions
                .values()
                .any(|permission| permission.permission_id == **permission_id)
        }) {
            return Err(AppError::NotFound(format!(
                "permission '{missing}' was not found"
            )));
        }

        let record = RoleRecord {
            role_id: RoleId::new(),
            role_name: role.role_name.clone(),
            permission_ids,
            created_by: role.created_by,
            created_at: Utc::now(),
        };
        roles.insert(role.role_name, record.clone());
        Ok(record)
    }

    async fn assign_role_to_users(
        &self,
        role_name: &str,
        user_ids: &BTreeSet<String>,
        operator: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let roles = self.roles.read().await;
        if !roles.contains_key(role_name) {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' was not found"
            )));
        }

        let mut assignments = self.assignments.write().await;
        let mut created = Vec::new();
        for user_id in user_ids {
            let key = (role_name.to_owned(), user_id.clone());
            if assignments.contains_key(&key) {
                continue;
            }

            let record = RoleAssignmentRecord {
                role_name: role_name.to_owned(),
                user_id: user_id.clone(),
                assigned_by: operator.to_owned(),
                assigned_at: Utc::now(),
            };
            assignments.insert(key, record.clone());
            created.push(record);
        }

        Ok(created)
    }

    async fn list_role_assignments(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        Ok(self
            .assignments
            .read()
            .await
            .iter()
            .filter_map(|((stored_role_name, _), assignment)| {
                (stored_role_name == role_name).then_some(assignment.clone())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests;
