//! Report commands: device compliance export and inactive device export

use crate::cmd::progress::{create_spinner, finish_spinner_error, finish_spinner_success};
use crate::config::ConfigManager;
use crate::error::{Result, Rpt365Error};
use crate::graph::compliance::GraphComplianceSource;
use crate::graph::GraphClient;
use crate::report::compliance::build_compliance_report;
use crate::report::export::{write_compliance_csv, write_inactive_csv};
use crate::report::inactive::find_inactive;
use crate::report::ComplianceSource;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ComplianceArgs {
    /// Output CSV path
    #[arg(short, long)]
    pub output: PathBuf,

    /// OData $filter applied to the device listing
    /// (e.g. "operatingSystem eq 'Windows'")
    #[arg(long)]
    pub filter: Option<String>,

    /// Tenant name (defaults to the active tenant)
    #[arg(short, long)]
    pub tenant: Option<String>,
}

#[derive(Args, Debug)]
pub struct InactiveArgs {
    /// Output CSV path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Devices that have not checked in for this many days
    #[arg(long, default_value_t = 30)]
    pub days: i64,

    /// Tenant name (defaults to the active tenant)
    #[arg(short, long)]
    pub tenant: Option<String>,
}

fn connect(tenant: Option<&str>) -> Result<(ConfigManager, String)> {
    let config = ConfigManager::load()?;

    let tenant_name = match tenant {
        Some(name) => name.to_string(),
        None => config
            .get_active_tenant()?
            .map(|t| t.name)
            .ok_or_else(|| {
                Rpt365Error::ConfigError("No active tenant. Run 'rpt365 login' first.".into())
            })?,
    };

    Ok((config, tenant_name))
}

pub async fn compliance(args: ComplianceArgs, verbose: bool) -> Result<()> {
    let (config, tenant_name) = connect(args.tenant.as_deref())?;
    println!(
        "{} device compliance for tenant {}...",
        "Reporting".cyan().bold(),
        tenant_name.cyan()
    );

    let client = GraphClient::from_config(&config, &tenant_name).await?;
    let source = GraphComplianceSource::new(client);

    let spinner = create_spinner("Scanning devices and compliance settings...");
    let report = match build_compliance_report(&source, args.filter.as_deref()).await {
        Ok(report) => {
            finish_spinner_success(
                &spinner,
                &format!(
                    "Scanned {} devices, {} setting columns discovered",
                    report.rows.len(),
                    report.columns.len()
                ),
            );
            report
        }
        Err(e) => {
            finish_spinner_error(&spinner, "Scan failed");
            return Err(e);
        }
    };

    print_warnings(&report.warnings);

    if verbose {
        println!("{} Columns: {}", "→".cyan(), report.columns.join(", "));
    }

    write_compliance_csv(&report, &args.output)?;
    println!(
        "{} Report saved to: {}",
        "✓".green(),
        args.output.display()
    );

    Ok(())
}

pub async fn inactive(args: InactiveArgs, verbose: bool) -> Result<()> {
    let (config, tenant_name) = connect(args.tenant.as_deref())?;
    println!(
        "{} devices inactive for {}+ days in tenant {}...",
        "Reporting".cyan().bold(),
        args.days,
        tenant_name.cyan()
    );

    let client = GraphClient::from_config(&config, &tenant_name).await?;
    let source = GraphComplianceSource::new(client);

    let spinner = create_spinner("Listing managed devices...");
    let devices = match source.list_devices(None).await {
        Ok(devices) if devices.is_empty() => {
            finish_spinner_error(&spinner, "No managed devices returned");
            return Err(Rpt365Error::NoDevices);
        }
        Ok(devices) => {
            finish_spinner_success(&spinner, &format!("Listed {} devices", devices.len()));
            devices
        }
        Err(e) => {
            finish_spinner_error(&spinner, "Device listing failed");
            return Err(e);
        }
    };

    let rows = find_inactive(&devices, args.days, chrono::Utc::now());
    println!(
        "{} {} of {} devices inactive",
        "→".cyan(),
        rows.len(),
        devices.len()
    );

    if verbose {
        for row in &rows {
            println!("  {} last sync: {}", row.device_name.dimmed(), row.last_sync);
        }
    }

    write_inactive_csv(&rows, &args.output)?;
    println!(
        "{} Report saved to: {}",
        "✓".green(),
        args.output.display()
    );

    Ok(())
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{} {}", "!".yellow(), warning);
    }
}
