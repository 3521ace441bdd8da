use async_trait::async_trait;

use confhub_core::AppResult;
use confhub_domain::AuditAction;

/// Canonical audit event payload emitted by role bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// User that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
