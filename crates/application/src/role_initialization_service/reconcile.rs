use std::collections::BTreeSet;

use confhub_core::AppError;
use confhub_domain::{AuditAction, PermissionId};
use tracing::{debug, info};

use crate::{
    AuditEvent, NewPermission, NewRole, PermissionRecord, RoleAssignmentRecord, RoleRecord,
};

use super::*;

impl RoleInitializationService {
    /// Creates a permission, falling back to the stored record on a duplicate.
    pub(super) async fn ensure_permission(
        &self,
        permission: NewPermission,
    ) -> AppResult<PermissionRecord> {
        let permission_type = permission.permission_type;
        let target_id = permission.target_id.clone();

        match self.repository.create_permission(permission).await {
            Ok(created) => Ok(created),
            Err(error) if error.is_conflict() => {
                debug!(
                    permission_type = %permission_type,
                    target_id = %target_id,
                    "permission already stored, reusing it"
                );
                self.repository
                    .find_permission(permission_type, target_id.as_str())
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "permission '{permission_type}' on '{target_id}' was reported as duplicate but could not be found"
                        ))
                    })
            }
            Err(error) => Err(error),
        }
    }

    /// Resolves each permission to its stored record, creating the missing ones.
    pub(super) async fn resolve_existing_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> AppResult<Vec<PermissionRecord>> {
        let mut resolved = Vec::with_capacity(permissions.len());

        for permission in permissions {
            let stored = self
                .repository
                .find_permission(permission.permission_type, permission.target_id.as_str())
                .await?;

            let record = match stored {
                Some(record) => record,
                None => self.ensure_permission(permission).await?,
            };
            resolved.push(record);
        }

        Ok(resolved)
    }

    /// Creates a role; `None` when a concurrent caller created it first.
    pub(super) async fn create_role(
        &self,
        role: NewRole,
        permission_ids: BTreeSet<PermissionId>,
    ) -> AppResult<Option<RoleRecord>> {
        let role_name = role.role_name.clone();

        match self
            .repository
            .create_role_with_permissions(role, permission_ids)
            .await
        {
            Ok(created) => Ok(Some(created)),
            Err(error) if error.is_conflict() => {
                info!(role_name = %role_name, "role created by a concurrent request");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Appends queued audit events once the writes they describe are stored.
    ///
    /// Events are flushed even when the convergence failed part way, and the
    /// convergence error takes precedence over an audit failure.
    pub(super) async fn flush_audit_events(
        &self,
        events: Vec<AuditEvent>,
        converged: AppResult<()>,
    ) -> AppResult<()> {
        let mut appended = Ok(());
        for event in events {
            if let Err(error) = self.audit_repository.append_event(event).await {
                appended = Err(error);
                break;
            }
        }

        converged.and(appended)
    }
}

pub(super) fn role_created_event(role: &RoleRecord) -> AuditEvent {
    AuditEvent {
        subject: role.created_by.clone(),
        action: AuditAction::SecurityRoleCreated,
        resource_type: "rbac_role".to_owned(),
        resource_id: role.role_name.clone(),
        detail: Some(format!(
            "created role '{}' with {} permission(s)",
            role.role_name,
            role.permission_ids.len()
        )),
    }
}

pub(super) fn role_assigned_event(assignment: &RoleAssignmentRecord) -> AuditEvent {
    AuditEvent {
        subject: assignment.assigned_by.clone(),
        action: AuditAction::SecurityRoleAssigned,
        resource_type: "rbac_user_role".to_owned(),
        resource_id: format!("{}:{}", assignment.user_id, assignment.role_name),
        detail: Some(format!(
            "assigned role '{}' to '{}'",
            assignment.role_name, assignment.user_id
        )),
    }
}
