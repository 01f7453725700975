//! Managed device listing via Microsoft Graph
//!
//! Device identity is the source of truth for every report row; it is fetched
//! once per run and not mutated afterwards.

use crate::error::Result;
use crate::graph::GraphClient;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One Intune-managed device as returned by
/// `deviceManagement/managedDevices`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDevice {
    pub id: String,

    #[serde(default)]
    pub device_name: String,

    #[serde(default)]
    pub user_principal_name: String,

    #[serde(default)]
    pub compliance_state: String,

    #[serde(default)]
    pub operating_system: String,

    #[serde(default)]
    pub last_sync_date_time: Option<DateTime<Utc>>,
}

impl ManagedDevice {
    /// Last sync rendered the way it appears in exports (empty if never synced)
    pub fn last_sync_display(&self) -> String {
        self.last_sync_date_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_default()
    }
}

const DEVICE_FIELDS: &str =
    "id,deviceName,userPrincipalName,complianceState,operatingSystem,lastSyncDateTime";

/// List all managed devices, optionally narrowed by a caller-supplied
/// OData `$filter` expression (e.g. `operatingSystem eq 'Windows'`)
pub async fn list_managed_devices(
    client: &GraphClient,
    filter: Option<&str>,
) -> Result<Vec<ManagedDevice>> {
    let mut endpoint = format!("deviceManagement/managedDevices?$select={}", DEVICE_FIELDS);

    if let Some(filter) = filter {
        endpoint.push_str("&$filter=");
        endpoint.push_str(&urlencoding::encode(filter));
    }

    client.get_all_pages(&endpoint).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_deserializes_with_missing_fields() {
        let device: ManagedDevice = serde_json::from_str(r#"{"id": "d-1"}"#).unwrap();
        assert_eq!(device.id, "d-1");
        assert_eq!(device.device_name, "");
        assert!(device.last_sync_date_time.is_none());
        assert_eq!(device.last_sync_display(), "");
    }

    #[test]
    fn test_last_sync_display_is_rfc3339() {
        let device: ManagedDevice = serde_json::from_str(
            r#"{"id": "d-2", "lastSyncDateTime": "2026-08-01T10:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(device.last_sync_display(), "2026-08-01T10:30:00+00:00");
    }
}
