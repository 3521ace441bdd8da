use async_trait::async_trait;
use sqlx::PgPool;

use confhub_application::{AuditEvent, AuditRepository};
use confhub_core::{AppError, AppResult};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                id,
                subject,
                action,
                resource_type,
                resource_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(event.subject)
        .bind(event.action.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use confhub_application::{AuditEvent, AuditRepository};
    use confhub_domain::AuditAction;
    use sqlx::PgPool;
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;

    use super::PostgresAuditRepository;

    static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

    async fn test_pool() -> Option<PgPool> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
        {
            Ok(pool) => pool,
            Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
        };

        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for postgres audit tests: {error}");
        }

        Some(pool)
    }

    #[tokio::test]
    async fn append_event_persists_entry() {
        let Some(pool) = test_pool().await else {
            return;
        };

        let repository = PostgresAuditRepository::new(pool.clone());
        let resource_id = format!("Master+{}", uuid::Uuid::new_v4().simple());
        let appended = repository
            .append_event(AuditEvent {
                subject: "alice".to_owned(),
                action: AuditAction::SecurityRoleCreated,
                resource_type: "rbac_role".to_owned(),
                resource_id: resource_id.clone(),
                detail: None,
            })
            .await;
        assert!(appended.is_ok());

        let action = sqlx::query_scalar::<_, String>(
            r#"
            SELECT action
            FROM audit_log_entries
            WHERE resource_type = 'rbac_role' AND resource_id = $1
            "#,
        )
        .bind(resource_id)
        .fetch_one(&pool)
        .await;
        assert_eq!(action.ok().as_deref(), Some("security.role.created"));
    }
}
