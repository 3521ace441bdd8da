use async_trait::async_trait;

use confhub_core::{AppResult, UserIdentity};

/// Resolves the user on whose behalf the current operation runs.
#[async_trait]
pub trait ActorContext: Send + Sync {
    /// Returns the acting user.
    async fn current_user(&self) -> AppResult<UserIdentity>;
}

/// Actor context bound to one fixed identity, for operational tooling.
#[derive(Debug, Clone)]
pub struct StaticActorContext {
    identity: UserIdentity,
}

impl StaticActorContext {
    /// Creates a context that always resolves to `identity`.
    #[must_use]
    pub fn new(identity: UserIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl ActorContext for StaticActorContext {
    async fn current_user(&self) -> AppResult<UserIdentity> {
        Ok(self.identity.clone())
    }
}
