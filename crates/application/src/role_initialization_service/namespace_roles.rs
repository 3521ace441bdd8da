use std::collections::BTreeSet;

use confhub_domain::{
    AppId, NamespaceName, NamespaceRole, namespace_role_name, namespace_target_id,
};
use tracing::debug;

use crate::{AuditEvent, NewPermission, NewRole};

use super::reconcile::role_created_event;
use super::*;

impl RoleInitializationService {
    /// Ensures the namespace modify and release roles exist.
    ///
    /// Each role kind is looked up and, when missing, created with its single
    /// permission independently of the other. Namespace roles are not assigned
    /// to anyone here.
    pub async fn init_namespace_roles(
        &self,
        app_id: &AppId,
        namespace_name: &NamespaceName,
    ) -> AppResult<()> {
        let mut operator = LazyOperator::unresolved(self.actor_context.as_ref());
        let mut events = Vec::new();
        let converged = self
            .converge_namespace_roles(app_id, namespace_name, &mut operator, &mut events)
            .await;

        self.flush_audit_events(events, converged).await
    }

    pub(super) async fn converge_namespace_roles(
        &self,
        app_id: &AppId,
        namespace_name: &NamespaceName,
        operator: &mut LazyOperator<'_>,
        events: &mut Vec<AuditEvent>,
    ) -> AppResult<()> {
        for role in NamespaceRole::ALL {
            let convergence = self
                .converge_namespace_role(role, app_id, namespace_name, operator, events)
                .await?;

            debug!(
                app_id = %app_id,
                namespace = %namespace_name,
                role = role.as_str(),
                outcome = ?convergence,
                "namespace role converged"
            );
        }

        Ok(())
    }

    async fn converge_namespace_role(
        &self,
        role: NamespaceRole,
        app_id: &AppId,
        namespace_name: &NamespaceName,
        operator: &mut LazyOperator<'_>,
        events: &mut Vec<AuditEvent>,
    ) -> AppResult<RoleConvergence> {
        let role_name = namespace_role_name(role, app_id, namespace_name);
        if self
            .repository
            .find_role_by_name(role_name.as_str())
            .await?
            .is_some()
        {
            return Ok(RoleConvergence::Existing);
        }

        let operator_id = operator.user_id().await?;
        let permission = self
            .ensure_permission(NewPermission {
                permission_type: role.permission_type(),
                target_id: namespace_target_id(app_id, namespace_name),
                created_by: operator_id.clone(),
            })
            .await?;

        let created = self
            .create_role(
                NewRole {
                    role_name,
                    created_by: operator_id,
                },
                BTreeSet::from([permission.permission_id]),
            )
            .await?;

        Ok(match created {
            Some(created) => {
                events.push(role_created_event(&created));
                RoleConvergence::Created
            }
            None => RoleConvergence::CreatedConcurrently,
        })
    }
}
