//! Device compliance report: column discovery and row flattening

use crate::error::{Result, Rpt365Error};
use crate::graph::compliance::SettingState;
use crate::graph::devices::ManagedDevice;
use crate::report::{ComplianceSource, SETTING_STATE_UNKNOWN};
use std::collections::BTreeSet;

/// Fully built compliance report, ready for export
#[derive(Debug)]
pub struct ComplianceReport {
    /// Discovered setting names, sorted; governs CSV column order
    pub columns: Vec<String>,
    /// One row per device, in device-listing order
    pub rows: Vec<ReportRow>,
    /// Per-device fetch problems encountered along the way
    pub warnings: Vec<String>,
}

/// One flattened device row
#[derive(Debug)]
pub struct ReportRow {
    pub device_name: String,
    pub user_principal_name: String,
    pub device_id: String,
    pub compliance_state: String,
    pub last_sync: String,
    /// Setting state values, parallel to the report's `columns`
    pub settings: Vec<String>,
}

impl ReportRow {
    /// Cells in export order: identity prefix, then settings
    pub fn record(&self) -> Vec<&str> {
        let mut cells = vec![
            self.device_name.as_str(),
            self.user_principal_name.as_str(),
            self.device_id.as_str(),
            self.compliance_state.as_str(),
            self.last_sync.as_str(),
        ];
        cells.extend(self.settings.iter().map(String::as_str));
        cells
    }
}

/// Fetch and flatten every setting state for one device
///
/// Any failure within the device's policies/settings fails the whole device
/// for this pass; the caller decides what that means (zero columns during
/// discovery, sentinel row during building).
async fn scan_device_settings<S: ComplianceSource + ?Sized>(
    source: &S,
    device_id: &str,
) -> Result<Vec<SettingState>> {
    let mut states = Vec::new();

    for policy in source.policy_states(device_id).await? {
        states.extend(source.setting_states(device_id, &policy.id).await?);
    }

    Ok(states)
}

/// Pass 1: discover the global, sorted, duplicate-free column set
///
/// A device whose fetch fails contributes zero columns and a warning; it
/// never aborts discovery for the rest of the fleet.
pub async fn discover_columns<S: ComplianceSource + ?Sized>(
    source: &S,
    devices: &[ManagedDevice],
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut names = BTreeSet::new();

    for device in devices {
        match scan_device_settings(source, &device.id).await {
            Ok(states) => {
                for state in &states {
                    if let Some(name) = state.column_name() {
                        names.insert(name.to_string());
                    }
                }
            }
            Err(e) => warnings.push(format!(
                "Device '{}' skipped during schema discovery: {}",
                device.device_name, e
            )),
        }
    }

    names.into_iter().collect()
}

/// Pass 2: build one row for one device against the frozen column set
///
/// Every setting cell starts at the sentinel and is overwritten when the
/// device reports a state for that column. Duplicate setting names within a
/// device resolve last-write-wins in policy iteration order. On fetch
/// failure the identity fields are still populated and all setting cells
/// stay at the sentinel.
pub async fn build_row<S: ComplianceSource + ?Sized>(
    source: &S,
    device: &ManagedDevice,
    columns: &[String],
    warnings: &mut Vec<String>,
) -> ReportRow {
    let mut settings = vec![SETTING_STATE_UNKNOWN.to_string(); columns.len()];

    match scan_device_settings(source, &device.id).await {
        Ok(states) => {
            for state in &states {
                if let Some(name) = state.column_name() {
                    // columns is sorted, so every resolvable name is findable
                    if let Ok(idx) = columns.binary_search_by(|c| c.as_str().cmp(name)) {
                        settings[idx] = state.state.clone();
                    }
                }
            }
        }
        Err(e) => warnings.push(format!(
            "Device '{}' row left at defaults: {}",
            device.device_name, e
        )),
    }

    ReportRow {
        device_name: device.device_name.clone(),
        user_principal_name: device.user_principal_name.clone(),
        device_id: device.id.clone(),
        compliance_state: device.compliance_state.clone(),
        last_sync: device.last_sync_display(),
        settings,
    }
}

/// Build the full compliance report: list devices, discover columns, then
/// flatten one row per device in listing order
pub async fn build_compliance_report<S: ComplianceSource + ?Sized>(
    source: &S,
    filter: Option<&str>,
) -> Result<ComplianceReport> {
    let devices = source.list_devices(filter).await?;

    if devices.is_empty() {
        return Err(Rpt365Error::NoDevices);
    }

    let mut warnings = Vec::new();
    let columns = discover_columns(source, &devices, &mut warnings).await;

    let mut rows = Vec::with_capacity(devices.len());
    for device in &devices {
        rows.push(build_row(source, device, &columns, &mut warnings).await);
    }

    Ok(ComplianceReport {
        columns,
        rows,
        warnings,
    })
}
