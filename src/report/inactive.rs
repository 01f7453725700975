//! Inactive device report: devices past a check-in threshold

use crate::graph::devices::ManagedDevice;
use chrono::{DateTime, Utc};

/// Fixed columns of the inactivity export
pub const INACTIVE_COLUMNS: [&str; 6] = [
    "DeviceName",
    "UserPrincipalName",
    "DeviceId",
    "OperatingSystem",
    "LastSyncDateTime",
    "DaysInactive",
];

#[derive(Debug)]
pub struct InactiveDeviceRow {
    pub device_name: String,
    pub user_principal_name: String,
    pub device_id: String,
    pub operating_system: String,
    pub last_sync: String,
    /// None for devices that have never checked in
    pub days_inactive: Option<i64>,
}

impl InactiveDeviceRow {
    /// Cells in export order; never-synced devices show `never`
    pub fn record(&self) -> Vec<String> {
        vec![
            self.device_name.clone(),
            self.user_principal_name.clone(),
            self.device_id.clone(),
            self.operating_system.clone(),
            self.last_sync.clone(),
            self.days_inactive
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string()),
        ]
    }
}

/// Filter the fleet down to devices whose last sync is at least
/// `threshold_days` before `now`, keeping the original listing order
///
/// Devices with no recorded sync are always considered inactive.
pub fn find_inactive(
    devices: &[ManagedDevice],
    threshold_days: i64,
    now: DateTime<Utc>,
) -> Vec<InactiveDeviceRow> {
    devices
        .iter()
        .filter_map(|device| {
            let days = device.last_sync_date_time.map(|t| (now - t).num_days());

            match days {
                Some(d) if d < threshold_days => None,
                _ => Some(InactiveDeviceRow {
                    device_name: device.device_name.clone(),
                    user_principal_name: device.user_principal_name.clone(),
                    device_id: device.id.clone(),
                    operating_system: device.operating_system.clone(),
                    last_sync: device.last_sync_display(),
                    days_inactive: days,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn device(id: &str, last_sync: Option<&str>) -> ManagedDevice {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "deviceName": format!("DEV-{}", id),
            "lastSyncDateTime": last_sync,
        }))
        .unwrap()
    }

    #[test]
    fn test_threshold_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 8, 31, 12, 0, 0).unwrap();
        let devices = vec![
            device("fresh", Some("2026-08-30T12:00:00Z")), // 1 day
            device("edge", Some("2026-08-01T12:00:00Z")),  // 30 days
            device("stale", Some("2026-06-01T12:00:00Z")), // 91 days
        ];

        let rows = find_inactive(&devices, 30, now);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].device_id, "edge");
        assert_eq!(rows[0].days_inactive, Some(30));
        assert_eq!(rows[1].device_id, "stale");
    }

    #[test]
    fn test_never_synced_is_always_inactive() {
        let now = Utc.with_ymd_and_hms(2026, 8, 31, 12, 0, 0).unwrap();
        let rows = find_inactive(&[device("new", None)], 30, now);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].days_inactive, None);
        assert_eq!(rows[0].record()[5], "never");
    }
}
