use clap::{Parser, Subcommand};
use colored::Colorize;
use rpt365::{cmd, error};

#[derive(Parser, Debug)]
#[command(
    name = "rpt365",
    about = "Compliance and inactivity reports for Microsoft 365 managed devices",
    version,
    long_about = "Microsoft 365 device reporting CLI\n\n\
                  Exports Intune device compliance and inactivity data to CSV\n\
                  via the Microsoft Graph API."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print per-device fetch warnings and details
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate to Microsoft Graph API
    Login(cmd::login::LoginArgs),

    /// Logout and clear cached credentials
    Logout(cmd::login::LogoutArgs),

    /// Manage tenant configurations
    #[command(subcommand)]
    Tenant(TenantCommands),

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(Subcommand, Debug)]
enum TenantCommands {
    /// Add a tenant configuration
    Add(cmd::tenant::TenantAddArgs),

    /// List configured tenants
    List(cmd::tenant::TenantListArgs),

    /// Switch the active tenant
    Use(cmd::tenant::TenantUseArgs),

    /// Remove a tenant configuration
    Remove(cmd::tenant::TenantRemoveArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommands {
    /// Device compliance report: one row per device, one column per
    /// compliance setting discovered anywhere in the fleet
    Compliance(cmd::report::ComplianceArgs),

    /// Devices that have not checked in for a number of days
    Inactive(cmd::report::InactiveArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    match cli.command {
        Commands::Login(args) => cmd::login::login(args).await?,
        Commands::Logout(args) => cmd::login::logout(args).await?,
        Commands::Tenant(tenant_cmd) => match tenant_cmd {
            TenantCommands::Add(args) => cmd::tenant::add(args).await?,
            TenantCommands::List(args) => cmd::tenant::list(args).await?,
            TenantCommands::Use(args) => cmd::tenant::use_tenant(args).await?,
            TenantCommands::Remove(args) => cmd::tenant::remove(args).await?,
        },
        Commands::Report(report_cmd) => match report_cmd {
            ReportCommands::Compliance(args) => {
                cmd::report::compliance(args, cli.verbose).await?
            }
            ReportCommands::Inactive(args) => cmd::report::inactive(args, cli.verbose).await?,
        },
    }

    Ok(())
}
