//! Deterministic role names and permission targets.
//!
//! Every name is a `+`-joined list of segments. Identifiers never contain `+`,
//! so distinct inputs always yield distinct names and a name lookup is enough
//! to tell whether a role was already created.

use crate::{AppId, NamespaceName, NamespaceRole};

const SEPARATOR: &str = "+";
const MASTER_ROLE_PREFIX: &str = "Master";

/// Builds the name of the application master role.
#[must_use]
pub fn app_master_role_name(app_id: &AppId) -> String {
    join(&[MASTER_ROLE_PREFIX, app_id.as_str()])
}

/// Builds the name of a namespace-scoped role of the given kind.
#[must_use]
pub fn namespace_role_name(
    role: NamespaceRole,
    app_id: &AppId,
    namespace_name: &NamespaceName,
) -> String {
    join(&[role.as_str(), app_id.as_str(), namespace_name.as_str()])
}

/// Builds the name of the namespace modify role.
#[must_use]
pub fn modify_namespace_role_name(app_id: &AppId, namespace_name: &NamespaceName) -> String {
    namespace_role_name(NamespaceRole::Modify, app_id, namespace_name)
}

/// Builds the name of the namespace release role.
#[must_use]
pub fn release_namespace_role_name(app_id: &AppId, namespace_name: &NamespaceName) -> String {
    namespace_role_name(NamespaceRole::Release, app_id, namespace_name)
}

/// Builds the permission target for application-scoped permissions.
#[must_use]
pub fn app_target_id(app_id: &AppId) -> String {
    app_id.as_str().to_owned()
}

/// Builds the permission target for namespace-scoped permissions.
#[must_use]
pub fn namespace_target_id(app_id: &AppId, namespace_name: &NamespaceName) -> String {
    join(&[app_id.as_str(), namespace_name.as_str()])
}

fn join(segments: &[&str]) -> String {
    segments.join(SEPARATOR)
}
