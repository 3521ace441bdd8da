use std::env;

use confhub_core::{AppError, UserIdentity};
use confhub_domain::{App, AppId, NamespaceName};
use tracing_subscriber::EnvFilter;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

const USAGE: &str = "usage: confhub-provisioner migrate \
    | init-app <app_id> <name> <org_id> <org_name> <owner_name> \
    | init-namespace <app_id> <namespace_name>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionerCommand {
    Migrate,
    InitApp(App),
    InitNamespace {
        app_id: AppId,
        namespace_name: NamespaceName,
    },
}

impl ProvisionerCommand {
    /// Parses the command from process arguments without the program name.
    pub fn parse<I>(arguments: I, actor: &UserIdentity) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let arguments: Vec<String> = arguments.into_iter().collect();
        let arguments: Vec<&str> = arguments.iter().map(String::as_str).collect();

        match arguments.as_slice() {
            ["migrate"] => Ok(Self::Migrate),
            ["init-app", app_id, name, org_id, org_name, owner_name] => {
                App::new(*app_id, *name, *org_id, *org_name, *owner_name, actor.user_id())
                    .map(Self::InitApp)
            }
            ["init-namespace", app_id, namespace_name] => Ok(Self::InitNamespace {
                app_id: AppId::new(*app_id)?,
                namespace_name: NamespaceName::new(*namespace_name)?,
            }),
            _ => Err(AppError::Validation(USAGE.to_owned())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub actor: UserIdentity,
    pub command: ProvisionerCommand,
}

impl ProvisionerConfig {
    pub fn load() -> Result<Self, AppError> {
        let database_url = required_non_empty_env("DATABASE_URL")?;
        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?,
            Err(_) => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };

        let actor_id = required_non_empty_env("PROVISIONER_ACTOR")?;
        let display_name = env::var("PROVISIONER_ACTOR_DISPLAY_NAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| actor_id.clone());
        let actor = UserIdentity::new(actor_id, display_name);

        let command = ProvisionerCommand::parse(env::args().skip(1), &actor)?;

        Ok(Self {
            database_url,
            database_max_connections,
            actor,
            command,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
