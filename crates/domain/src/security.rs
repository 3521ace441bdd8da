use std::str::FromStr;

use confhub_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of permission a portal role can bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionType {
    /// Allows creating clusters inside an application.
    CreateCluster,
    /// Allows creating namespaces inside an application.
    CreateNamespace,
    /// Allows granting application roles to other users.
    AssignRole,
    /// Allows editing configuration items of a namespace.
    ModifyNamespace,
    /// Allows releasing configuration of a namespace.
    ReleaseNamespace,
}

impl PermissionType {
    /// Returns a stable storage value for this permission type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCluster => "CreateCluster",
            Self::CreateNamespace => "CreateNamespace",
            Self::AssignRole => "AssignRole",
            Self::ModifyNamespace => "ModifyNamespace",
            Self::ReleaseNamespace => "ReleaseNamespace",
        }
    }

    /// Permission types bundled into an application master role.
    #[must_use]
    pub fn app_master() -> &'static [Self] {
        const APP_MASTER: &[PermissionType] = &[
            PermissionType::CreateCluster,
            PermissionType::CreateNamespace,
            PermissionType::AssignRole,
        ];

        APP_MASTER
    }
}

impl FromStr for PermissionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CreateCluster" => Ok(Self::CreateCluster),
            "CreateNamespace" => Ok(Self::CreateNamespace),
            "AssignRole" => Ok(Self::AssignRole),
            "ModifyNamespace" => Ok(Self::ModifyNamespace),
            "ReleaseNamespace" => Ok(Self::ReleaseNamespace),
            _ => Err(AppError::Validation(format!(
                "unknown permission type '{value}'"
            ))),
        }
    }
}

impl std::fmt::Display for PermissionType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Namespace-scoped role kinds created for every namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamespaceRole {
    /// Role bundling the namespace modify permission.
    Modify,
    /// Role bundling the namespace release permission.
    Release,
}

impl NamespaceRole {
    /// Namespace role kinds in convergence order.
    pub const ALL: [Self; 2] = [Self::Modify, Self::Release];

    /// Returns the permission type bundled into this role.
    #[must_use]
    pub fn permission_type(&self) -> PermissionType {
        match self {
            Self::Modify => PermissionType::ModifyNamespace,
            Self::Release => PermissionType::ReleaseNamespace,
        }
    }

    /// Returns the role name prefix used by the naming functions.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modify => "ModifyNamespace",
            Self::Release => "ReleaseNamespace",
        }
    }
}

/// Store-assigned permission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a new random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Store-assigned role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Stable audit actions emitted by role bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    SecurityRoleCreated,
    /// Emitted when a role is assigned to a user.
    SecurityRoleAssigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleCreated => "security.role.created",
            Self::SecurityRoleAssigned => "security.role.assigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{NamespaceRole, PermissionType};

    #[test]
    fn permission_type_roundtrip_storage_value() {
        let permission_type = PermissionType::ReleaseNamespace;
        let restored = PermissionType::from_str(permission_type.as_str());
        assert!(matches!(restored, Ok(PermissionType::ReleaseNamespace)));
    }

    #[test]
    fn unknown_permission_type_is_rejected() {
        let parsed = PermissionType::from_str("DeleteNamespace");
        assert!(parsed.is_err());
    }

    #[test]
    fn namespace_roles_bundle_matching_permission() {
        assert_eq!(
            NamespaceRole::Modify.permission_type(),
            PermissionType::ModifyNamespace
        );
        assert_eq!(
            NamespaceRole::Release.permission_type(),
            PermissionType::ReleaseNamespace
        );
    }

    #[test]
    fn master_permissions_do_not_overlap_namespace_permissions() {
        for role in NamespaceRole::ALL {
            assert!(!PermissionType::app_master().contains(&role.permission_type()));
        }
    }
}
