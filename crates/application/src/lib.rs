//! Application services and ports.

#![forbid(unsafe_code)]

mod role_initialization_service;
mod role_permission_ports;

pub use role_initialization_service::RoleInitializationService;
pub use role_permission_ports::{
    ActorContext, AuditEvent, AuditRepository, NewPermission, NewRole, PermissionRecord,
    RoleAssignmentRecord, RoleRecord, RolePermissionRepository, StaticActorContext,
};
