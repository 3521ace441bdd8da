use confhub_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Namespace every application owns from the moment it is created.
pub const DEFAULT_NAMESPACE_NAME: &str = "application";

/// Validated application identifier.
///
/// Only ASCII letters, digits, `_`, `.` and `-` are accepted, which keeps the
/// role naming separator out of every identifier segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppId(String);

impl AppId {
    /// Creates a validated application identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        validate_identifier("app_id", value.as_str())?;
        Ok(Self(value.into()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated namespace name, unique within one application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Creates a validated namespace name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        validate_identifier("namespace_name", value.as_str())?;
        Ok(Self(value.into()))
    }

    /// Returns the default namespace every application carries.
    #[must_use]
    pub fn default_namespace() -> Self {
        Self(DEFAULT_NAMESPACE_NAME.to_owned())
    }

    /// Returns the namespace name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for NamespaceName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Portal application as handed over by the app-creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    app_id: AppId,
    name: NonEmptyString,
    org_id: String,
    org_name: String,
    owner_name: String,
    created_by: String,
}

impl App {
    /// Creates a validated application.
    pub fn new(
        app_id: impl Into<String>,
        name: impl Into<String>,
        org_id: impl Into<String>,
        org_name: impl Into<String>,
        owner_name: impl Into<String>,
        created_by: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            app_id: AppId::new(app_id)?,
            name: NonEmptyString::new(name)?,
            org_id: org_id.into(),
            org_name: org_name.into(),
            owner_name: owner_name.into(),
            created_by: created_by.into(),
        })
    }

    /// Returns the externally assigned application id.
    #[must_use]
    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Returns the application display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning organization id.
    #[must_use]
    pub fn org_id(&self) -> &str {
        self.org_id.as_str()
    }

    /// Returns the owning organization name.
    #[must_use]
    pub fn org_name(&self) -> &str {
        self.org_name.as_str()
    }

    /// Returns the owner user name.
    #[must_use]
    pub fn owner_name(&self) -> &str {
        self.owner_name.as_str()
    }

    /// Returns the user who created the application record.
    #[must_use]
    pub fn created_by(&self) -> &str {
        self.created_by.as_str()
    }
}

fn validate_identifier(field: &str, value: &str) -> AppResult<()> {
    let is_valid = value.chars().all(|character| {
        character.is_ascii_alphanumeric() || matches!(character, '_' | '.' | '-')
    });

    if !is_valid {
        return Err(AppError::Validation(format!(
            "{field} '{value}' may only contain letters, digits, '_', '.' and '-'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{App, AppId, DEFAULT_NAMESPACE_NAME, NamespaceName};

    #[test]
    fn app_id_rejects_naming_separator() {
        assert!(AppId::new("1000+evil").is_err());
        assert!(AppId::new("  ").is_err());
        assert!(AppId::new("order-service_v2.1").is_ok());
    }

    #[test]
    fn namespace_name_rejects_whitespace_inside() {
        assert!(NamespaceName::new("name space").is_err());
        assert!(NamespaceName::new("namespace-test").is_ok());
    }

    #[test]
    fn default_namespace_is_application() {
        assert_eq!(
            NamespaceName::default_namespace().as_str(),
            DEFAULT_NAMESPACE_NAME
        );
    }

    #[test]
    fn app_requires_valid_id_and_name() {
        assert!(App::new("1000", "app-test", "1", "xx", "user", "user").is_ok());
        assert!(App::new("1000", " ", "1", "xx", "user", "user").is_err());
        assert!(App::new("10 00", "app-test", "1", "xx", "user", "user").is_err());
    }
}
