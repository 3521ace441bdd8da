use std::collections::BTreeSet;

use confhub_domain::{
    App, AppId, NamespaceName, PermissionType, app_master_role_name, app_target_id,
};
use tracing::{debug, info};

use crate::{AuditEvent, NewPermission, NewRole, PermissionRecord};

use super::reconcile::{role_assigned_event, role_created_event};
use super::*;

impl RoleInitializationService {
    /// Ensures the application master role exists and is held by the acting user.
    ///
    /// The master role doubles as the idempotency sentinel: when it is found the
    /// call returns without any further lookups or writes. Otherwise the master
    /// permissions and role are created, the role is assigned to the acting user
    /// and the default namespace roles are converged. Audit events are appended
    /// only after those writes, so an audit failure never leaves the master role
    /// without its holder.
    pub async fn init_app_roles(&self, app: &App) -> AppResult<()> {
        let app_id = app.app_id();
        let master_role_name = app_master_role_name(app_id);

        if self
            .repository
            .find_role_by_name(master_role_name.as_str())
            .await?
            .is_some()
        {
            debug!(app_id = %app_id, "app roles already initialized");
            return Ok(());
        }

        let actor = self.actor_context.current_user().await?;
        let operator_id = actor.user_id();

        let permissions = self
            .ensure_app_master_permissions(app_id, operator_id)
            .await?;
        let Some(master_role) = self
            .create_role(
                NewRole {
                    role_name: master_role_name.clone(),
                    created_by: operator_id.to_owned(),
                },
                permissions
                    .iter()
                    .map(|permission| permission.permission_id)
                    .collect(),
            )
            .await?
        else {
            info!(app_id = %app_id, "app roles initialized by a concurrent request");
            return Ok(());
        };

        let mut events = vec![role_created_event(&master_role)];
        let converged = self
            .assign_and_converge_defaults(app_id, &master_role_name, operator_id, &mut events)
            .await;
        self.flush_audit_events(events, converged).await?;

        info!(
            app_id = %app_id,
            app_name = %app.name(),
            operator = %operator_id,
            operator_name = %actor.display_name(),
            "app roles initialized"
        );
        Ok(())
    }

    async fn assign_and_converge_defaults(
        &self,
        app_id: &AppId,
        master_role_name: &str,
        operator_id: &str,
        events: &mut Vec<AuditEvent>,
    ) -> AppResult<()> {
        let user_ids = BTreeSet::from([operator_id.to_owned()]);
        let assignments = self
            .repository
            .assign_role_to_users(master_role_name, &user_ids, operator_id)
            .await?;
        events.extend(assignments.iter().map(role_assigned_event));

        let default_namespace = NamespaceName::default_namespace();
        let mut operator =
            LazyOperator::resolved(self.actor_context.as_ref(), operator_id.to_owned());
        self.converge_namespace_roles(app_id, &default_namespace, &mut operator, events)
            .await
    }

    async fn ensure_app_master_permissions(
        &self,
        app_id: &AppId,
        operator_id: &str,
    ) -> AppResult<Vec<PermissionRecord>> {
        let target_id = app_target_id(app_id);
        let permissions: Vec<NewPermission> = PermissionType::app_master()
            .iter()
            .map(|permission_type| NewPermission {
                permission_type: *permission_type,
                target_id: target_id.clone(),
                created_by: operator_id.to_owned(),
            })
            .collect();

        match self.repository.create_permissions(permissions.clone()).await {
            Ok(created) => Ok(created),
            Err(error) if error.is_conflict() => {
                debug!(
                    app_id = %app_id,
                    error = %error,
                    "app permissions partially present, resolving individually"
                );
                self.resolve_existing_permissions(permissions).await
            }
            Err(error) => Err(error),
        }
    }
}
