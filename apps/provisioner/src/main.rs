//! Confhub role provisioner composition root.

#![forbid(unsafe_code)]

mod provisioner_config;

use std::sync::Arc;

use confhub_application::{RoleInitializationService, StaticActorContext};
use confhub_core::AppError;
use confhub_infrastructure::{PostgresAuditRepository, PostgresRolePermissionRepository};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::provisioner_config::{ProvisionerCommand, ProvisionerConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ProvisionerConfig::load()?;
    let pool = connect_and_migrate(&config).await?;

    let service = RoleInitializationService::new(
        Arc::new(PostgresRolePermissionRepository::new(pool.clone())),
        Arc::new(StaticActorContext::new(config.actor.clone())),
        Arc::new(PostgresAuditRepository::new(pool)),
    );

    match config.command {
        ProvisionerCommand::Migrate => {
            info!("database migrations applied successfully");
        }
        ProvisionerCommand::InitApp(app) => {
            service.init_app_roles(&app).await?;
            info!(
                app_id = %app.app_id(),
                actor = %config.actor.user_id(),
                "application roles initialized"
            );
        }
        ProvisionerCommand::InitNamespace {
            app_id,
            namespace_name,
        } => {
            service
                .init_namespace_roles(&app_id, &namespace_name)
                .await?;
            info!(
                app_id = %app_id,
                namespace_name = %namespace_name,
                "namespace roles initialized"
            );
        }
    }

    Ok(())
}

async fn connect_and_migrate(config: &ProvisionerConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}
