use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use confhub_application::{
    NewPermission, NewRole, PermissionRecord, RoleAssignmentRecord, RoleInitializationService,
    RolePermissionRepository, RoleRecord, StaticActorContext,
};
use confhub_core::{AppError, AppResult, UserIdentity};
use confhub_domain::{App, AppId, NamespaceName, PermissionId, PermissionType};
use tokio::sync::Barrier;

use super::InMemoryRolePermissionRepository;
use crate::InMemoryAuditRepository;

fn new_permission(permission_type: PermissionType, target_id: &str) -> NewPermission {
    NewPermission {
        permission_type,
        target_id: target_id.to_owned(),
        created_by: "alice".to_owned(),
    }
}

fn new_role(role_name: &str) -> NewRole {
    NewRole {
        role_name: role_name.to_owned(),
        created_by: "alice".to_owned(),
    }
}

#[tokio::test]
async fn duplicate_permission_is_reported_as_conflict() {
    let repository = InMemoryRolePermissionRepository::new();

    let first = repository
        .create_permission(new_permission(PermissionType::ModifyNamespace, "1000+ns"))
        .await;
    let second = repository
        .create_permission(new_permission(PermissionType::ModifyNamespace, "1000+ns"))
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(repository.permission_count().await, 1);
}

#[tokio::test]
async fn batch_permission_create_is_all_or_nothing() {
    let repository = InMemoryRolePermissionRepository::new();
    let seeded = repository
        .create_permission(new_permission(PermissionType::AssignRole, "1000"))
        .await;
    assert!(seeded.is_ok());

    let batch = repository
        .create_permissions(vec![
            new_permission(PermissionType::CreateCluster, "1000"),
            new_permission(PermissionType::AssignRole, "1000"),
        ])
        .await;

    assert!(matches!(batch, Err(AppError::Conflict(_))));
    assert_eq!(repository.permission_count().await, 1);
    let cluster = repository
        .find_permission(PermissionType::CreateCluster, "1000")
        .await;
    assert!(matches!(cluster, Ok(None)));
}

#[tokio::test]
async fn duplicate_role_is_reported_as_conflict() {
    let repository = InMemoryRolePermissionRepository::new();

    let first = repository
        .create_role_with_permissions(new_role("Master+1000"), BTreeSet::new())
        .await;
    let second = repository
        .create_role_with_permissions(new_role("Master+1000"), BTreeSet::new())
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn role_requires_known_permissions() {
    let repository = InMemoryRolePermissionRepository::new();

    let result = repository
        .create_role_with_permissions(
            new_role("Master+1000"),
            BTreeSet::from([PermissionId::new()]),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(repository.role_count().await, 0);
}

#[tokio::test]
async fn role_keeps_bundled_permissions() {
    let repository = InMemoryRolePermissionRepository::new();
    let permission = match repository
        .create_permission(new_permission(PermissionType::ReleaseNamespace, "1000+ns"))
        .await
    {
        Ok(permission) => permission,
        Err(error) => panic!("failed to create permission: {error}"),
    };

    let created = repository
        .create_role_with_permissions(
            new_role("ReleaseNamespace+1000+ns"),
            BTreeSet::from([permission.permission_id]),
        )
        .await;
    assert!(created.is_ok());

    let found = repository
        .find_role_by_name("ReleaseNamespace+1000+ns")
        .await
        .ok()
        .flatten()
        .map(|role| role.permission_ids);
    assert_eq!(found, Some(BTreeSet::from([permission.permission_id])));
}

#[tokio::test]
async fn assignment_skips_existing_pairs_and_unknown_roles_fail() {
    let repository = InMemoryRolePermissionRepository::new();
    let role = repository
        .create_role_with_permissions(new_role("Master+1000"), BTreeSet::new())
        .await;
    assert!(role.is_ok());

    let users = BTreeSet::from(["alice".to_owned(), "bob".to_owned()]);
    let first = repository
        .assign_role_to_users("Master+1000", &users, "alice")
        .await
        .map(|assignments| assignments.len());
    let second = repository
        .assign_role_to_users("Master+1000", &users, "alice")
        .await
        .map(|assignments| assignments.len());
    let unknown = repository
        .assign_role_to_users("Master+2000", &users, "alice")
        .await;

    assert_eq!(first.ok(), Some(2));
    assert_eq!(second.ok(), Some(0));
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let listed = repository
        .list_role_assignments("Master+1000")
        .await
        .map(|assignments| {
            assignments
                .into_iter()
                .map(|assignment| assignment.user_id)
                .collect::<Vec<_>>()
        });
    assert_eq!(
        listed.ok(),
        Some(vec!["alice".to_owned(), "bob".to_owned()])
    );
}

#[tokio::test]
async fn service_converges_app_and_namespace_roles_against_store() {
    let repository = Arc::new(InMemoryRolePermissionRepository::new());
    let audit_repository = Arc::new(InMemoryAuditRepository::new());
    let service = RoleInitializationService::new(
        repository.clone(),
        Arc::new(StaticActorContext::new(UserIdentity::new("user", "User"))),
        audit_repository.clone(),
    );

    let app = match App::new("1000", "app-test", "1", "xx", "user", "user") {
        Ok(app) => app,
        Err(error) => panic!("invalid test app: {error}"),
    };
    let (app_id, namespace) = match (AppId::new("1000"), NamespaceName::new("namespace-test")) {
        (Ok(app_id), Ok(namespace)) => (app_id, namespace),
        _ => panic!("invalid test keys"),
    };

    for _ in 0..2 {
        assert!(service.init_app_roles(&app).await.is_ok());
        assert!(
            service
                .init_namespace_roles(&app_id, &namespace)
                .await
                .is_ok()
        );
    }

    assert_eq!(repository.role_count().await, 5);
    assert_eq!(repository.permission_count().await, 7);

    let master_holders = repository
        .list_role_assignments("Master+1000")
        .await
        .map(|assignments| {
            assignments
                .into_iter()
                .map(|assignment| (assignment.user_id, assignment.assigned_by))
                .collect::<Vec<_>>()
        });
    assert_eq!(
        master_holders.ok(),
        Some(vec![("user".to_owned(), "user".to_owned())])
    );
    assert_eq!(audit_repository.events().await.len(), 6);
}

/// Holds every caller at each role lookup until all have arrived, so they all
/// observe the same missing role and race on the create.
struct LookupRendezvous {
    inner: Arc<InMemoryRolePermissionRepository>,
    lookups: Barrier,
    conflicts: AtomicUsize,
}

impl LookupRendezvous {
    fn new(inner: Arc<InMemoryRolePermissionRepository>, callers: usize) -> Self {
        Self {
            inner,
            lookups: Barrier::new(callers),
            conflicts: AtomicUsize::new(0),
        }
    }

    fn count_conflict<T>(&self, result: AppResult<T>) -> AppResult<T> {
        if matches!(result, Err(AppError::Conflict(_))) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

#[async_trait]
impl RolePermissionRepository for LookupRendezvous {
    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        let found = self.inner.find_role_by_name(role_name).await;
        self.lookups.wait().await;
        found
    }

    async fn find_permission(
        &self,
        permission_type: PermissionType,
        target_id: &str,
    ) -> AppResult<Option<PermissionRecord>> {
        self.inner.find_permission(permission_type, target_id).await
    }

    async fn create_permission(&self, permission: NewPermission) -> AppResult<PermissionRecord> {
        let created = self.inner.create_permission(permission).await;
        self.count_conflict(created)
    }

    async fn create_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> AppResult<Vec<PermissionRecord>> {
        let created = self.inner.create_permissions(permissions).await;
        self.count_conflict(created)
    }

    async fn create_role_with_permissions(
        &self,
        role: NewRole,
        permission_ids: BTreeSet<PermissionId>,
    ) -> AppResult<RoleRecord> {
        let created = self
            .inner
            .create_role_with_permissions(role, permission_ids)
            .await;
        self.count_conflict(created)
    }

    async fn assign_role_to_users(
        &self,
        role_name: &str,
        user_ids: &BTreeSet<String>,
        operator: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.inner
            .assign_role_to_users(role_name, user_ids, operator)
            .await
    }

    async fn list_role_assignments(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.inner.list_role_assignments(role_name).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_namespace_initializations_reconcile_duplicate_creates() {
    const CALLERS: usize = 4;

    let store = Arc::new(InMemoryRolePermissionRepository::new());
    let repository = Arc::new(LookupRendezvous::new(store.clone(), CALLERS));
    let audit_repository = Arc::new(InMemoryAuditRepository::new());
    let service = RoleInitializationService::new(
        repository.clone(),
        Arc::new(StaticActorContext::new(UserIdentity::new("user", "User"))),
        audit_repository.clone(),
    );
    let (app_id, namespace) = match (AppId::new("1000"), NamespaceName::new("namespace-test")) {
        (Ok(app_id), Ok(namespace)) => (app_id, namespace),
        _ => panic!("invalid test keys"),
    };

    let mut handles = Vec::new();
    for _ in 0..CALLERS {
        let service = service.clone();
        let app_id = app_id.clone();
        let namespace = namespace.clone();
        handles.push(tokio::spawn(async move {
            service.init_namespace_roles(&app_id, &namespace).await
        }));
    }

    for handle in handles {
        let outcome = handle.await;
        assert!(matches!(outcome, Ok(Ok(()))));
    }

    assert_eq!(store.role_count().await, 2);
    assert_eq!(store.permission_count().await, 2);
    // Each role kind: one caller wins both creates, the others lose the
    // permission create and then the role create.
    assert_eq!(
        repository.conflicts.load(Ordering::SeqCst),
        2 * 2 * (CALLERS - 1)
    );
    assert_eq!(audit_repository.events().await.len(), 2);
}
