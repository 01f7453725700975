use crate::config::{AuthType, ConfigManager, TenantConfig};
use crate::error::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct TenantAddArgs {
    /// Tenant name
    name: String,

    /// Tenant ID (Azure AD tenant ID)
    #[arg(long)]
    tenant_id: String,

    /// Client ID (Application ID)
    #[arg(long)]
    client_id: String,

    /// Client secret (for client credentials flow)
    #[arg(long)]
    client_secret: Option<String>,

    /// Tenant description
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
pub struct TenantListArgs {
    /// Show detailed information
    #[arg(long)]
    detailed: bool,
}

#[derive(Args, Debug)]
pub struct TenantUseArgs {
    /// Tenant name to activate
    name: String,
}

#[derive(Args, Debug)]
pub struct TenantRemoveArgs {
    /// Tenant name to remove
    name: String,
}

pub async fn add(args: TenantAddArgs) -> Result<()> {
    let config_manager = ConfigManager::new()?;

    let auth_type = if args.client_secret.is_some() {
        AuthType::ClientCredentials
    } else {
        AuthType::DeviceCode
    };

    let tenant = TenantConfig {
        name: args.name.clone(),
        tenant_id: args.tenant_id,
        client_id: args.client_id,
        client_secret: args.client_secret,
        auth_type,
        description: args.description,
    };

    config_manager.add_tenant(tenant)?;

    println!("{} Tenant '{}' added", "✓".green(), args.name);
    println!(
        "{} Run {} to authenticate",
        "→".cyan(),
        format!("rpt365 login {}", args.name).bold()
    );

    Ok(())
}

pub async fn list(args: TenantListArgs) -> Result<()> {
    let config_manager = ConfigManager::new()?;
    let tenants = config_manager.load_tenants()?;
    let config = config_manager.load_config()?;

    if tenants.is_empty() {
        println!("{} No tenants configured", "!".yellow());
        println!(
            "{} Run {} to add one",
            "→".cyan(),
            "rpt365 tenant add".bold()
        );
        return Ok(());
    }

    println!("\n{}", "Configured Tenants:".bold());

    for tenant in &tenants {
        let is_current = config.current_tenant.as_ref() == Some(&tenant.name);
        let marker = if is_current {
            "●".green()
        } else {
            "○".dimmed()
        };

        println!("{} {}", marker, tenant.name.bold());

        if args.detailed {
            println!("  Tenant ID: {}", tenant.tenant_id);
            println!("  Client ID: {}", tenant.client_id);
            println!("  Auth Type: {:?}", tenant.auth_type);

            if let Some(desc) = &tenant.description {
                println!("  Description: {}", desc);
            }

            match config_manager.load_token(&tenant.name) {
                Ok(token) => println!(
                    "  Token: {} (expires {})",
                    "valid".green(),
                    token.expires_at.format("%Y-%m-%d %H:%M UTC")
                ),
                Err(_) => println!("  Token: {}", "not authenticated".dimmed()),
            }
        }
    }

    Ok(())
}

pub async fn use_tenant(args: TenantUseArgs) -> Result<()> {
    let config_manager = ConfigManager::new()?;
    config_manager.set_active_tenant(&args.name)?;
    println!("{} Active tenant is now '{}'", "✓".green(), args.name);
    Ok(())
}

pub async fn remove(args: TenantRemoveArgs) -> Result<()> {
    let config_manager = ConfigManager::new()?;
    config_manager.remove_tenant(&args.name)?;
    println!("{} Tenant '{}' removed", "✓".green(), args.name);
    Ok(())
}
