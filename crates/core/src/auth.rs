use serde::{Deserialize, Serialize};

/// Identity of the user on whose behalf portal operations run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: String,
    display_name: String,
}

impl UserIdentity {
    /// Creates a user identity from data resolved by the identity provider.
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the stable user id recorded as operator and assignee.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
