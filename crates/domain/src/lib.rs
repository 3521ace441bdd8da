//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod app;
mod role_naming;
mod security;

pub use app::{App, AppId, DEFAULT_NAMESPACE_NAME, NamespaceName};
pub use role_naming::{
    app_master_role_name, app_target_id, modify_namespace_role_name, namespace_role_name,
    namespace_target_id, release_namespace_role_name,
};
pub use security::{AuditAction, NamespaceRole, PermissionId, PermissionType, RoleId};
