mod actor;
mod audit;
mod records;
mod repository;

pub use actor::{ActorContext, StaticActorContext};
pub use audit::{AuditEvent, AuditRepository};
pub use records::{NewPermission, NewRole, PermissionRecord, RoleAssignmentRecord, RoleRecord};
pub use repository::RolePermissionRepository;
