use crate::config::{AuthType, ConfigManager, TenantConfig};
use crate::error::{Result, Rpt365Error};
use crate::graph::auth::GraphAuth;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Tenant name. Checks configured tenants first, then ~/.config/rpt365/{name}.env
    #[arg(index = 1)]
    name: Option<String>,

    /// Tenant ID (Azure AD tenant ID), for inline registration
    #[arg(long)]
    tenant_id: Option<String>,

    /// Client ID (Application ID), for inline registration
    #[arg(long)]
    client_id: Option<String>,

    /// Client secret (switches to the client credentials flow)
    #[arg(long)]
    client_secret: Option<String>,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Tenant name (defaults to the active tenant)
    #[arg(short, long)]
    tenant: Option<String>,
}

pub async fn login(args: LoginArgs) -> Result<()> {
    let config = ConfigManager::load()?;

    let tenant = resolve_tenant(&config, &args)?;
    config.add_tenant(tenant.clone())?;

    let auth = GraphAuth::new(config.clone());
    match tenant.auth_type {
        AuthType::ClientCredentials => auth.login_client_credentials(&tenant).await?,
        AuthType::DeviceCode => auth.login_device_code(&tenant).await?,
    };

    config.set_active_tenant(&tenant.name)?;
    println!(
        "{} Tenant '{}' is now active",
        "✓".green(),
        tenant.name.bold()
    );

    Ok(())
}

fn resolve_tenant(config: &ConfigManager, args: &LoginArgs) -> Result<TenantConfig> {
    let name = args.name.as_deref().unwrap_or("default");

    // Inline registration takes priority over anything stored
    if let (Some(tenant_id), Some(client_id)) = (&args.tenant_id, &args.client_id) {
        println!(
            "{} App registration needs: {}",
            "→".cyan(),
            crate::graph::auth::REQUIRED_SCOPES.join(", ")
        );
        return Ok(TenantConfig {
            name: name.to_string(),
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            client_secret: args.client_secret.clone(),
            auth_type: if args.client_secret.is_some() {
                AuthType::ClientCredentials
            } else {
                AuthType::DeviceCode
            },
            description: None,
        });
    }

    if let Ok(tenant) = config.get_tenant(name) {
        return Ok(tenant);
    }

    if let Some(tenant) = config.load_env_file(name)? {
        println!(
            "{} Imported tenant '{}' from .env",
            "→".cyan(),
            tenant.name
        );
        return Ok(tenant);
    }

    Err(Rpt365Error::ConfigError(format!(
        "Tenant '{}' is not configured. Run 'rpt365 tenant add {}' or pass --tenant-id/--client-id",
        name, name
    )))
}

pub async fn logout(args: LogoutArgs) -> Result<()> {
    let config = ConfigManager::load()?;

    let tenant_name = match args.tenant {
        Some(name) => name,
        None => config
            .get_active_tenant()?
            .map(|t| t.name)
            .ok_or_else(|| Rpt365Error::ConfigError("No active tenant".into()))?,
    };

    GraphAuth::new(config).logout(&tenant_name)
}
