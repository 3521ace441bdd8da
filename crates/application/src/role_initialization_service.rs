use std::sync::Arc;

use confhub_core::AppResult;

use crate::{ActorContext, AuditRepository, RolePermissionRepository};

/// Outcome of converging one role against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleConvergence {
    /// The role was already stored; nothing was written.
    Existing,
    /// The role was created by this call.
    Created,
    /// Another caller created the role between lookup and create.
    CreatedConcurrently,
}

/// Bootstraps the default roles and permissions of applications and namespaces.
///
/// Both entry points are lookup-then-create convergences keyed on deterministic
/// role names, so they may be invoked on every creation request and re-invoked
/// after a failure.
#[derive(Clone)]
pub struct RoleInitializationService {
    repository: Arc<dyn RolePermissionRepository>,
    actor_context: Arc<dyn ActorContext>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleInitializationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RolePermissionRepository>,
        actor_context: Arc<dyn ActorContext>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            actor_context,
            audit_repository,
        }
    }
}

/// Acting user, resolved on first use and at most once per entry point call.
struct LazyOperator<'a> {
    actor_context: &'a dyn ActorContext,
    user_id: Option<String>,
}

impl<'a> LazyOperator<'a> {
    fn unresolved(actor_context: &'a dyn ActorContext) -> Self {
        Self {
            actor_context,
            user_id: None,
        }
    }

    fn resolved(actor_context: &'a dyn ActorContext, user_id: String) -> Self {
        Self {
            actor_context,
            user_id: Some(user_id),
        }
    }

    async fn user_id(&mut self) -> AppResult<String> {
        if let Some(user_id) = &self.user_id {
            return Ok(user_id.clone());
        }

        let user_id = self.actor_context.current_user().await?.user_id().to_owned();
        self.user_id = Some(user_id.clone());
        Ok(user_id)
    }
}

mod app_roles;
mod namespace_roles;
mod reconcile;
