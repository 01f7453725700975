//! Compliance policy and setting state fetching
//!
//! Wraps the per-device Graph endpoints behind [`ComplianceSource`] so the
//! report builder can be tested against an in-memory source.

use crate::error::Result;
use crate::graph::devices::{self, ManagedDevice};
use crate::graph::GraphClient;
use crate::report::ComplianceSource;
use async_trait::async_trait;
use serde::Deserialize;

/// One compliance policy applied to one device
///
/// From `deviceManagement/managedDevices/{id}/deviceCompliancePolicyStates`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyState {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub state: String,
}

/// One setting under one policy state
///
/// The Graph payload carries two name fields: `settingName` (display name)
/// and `setting` (definition identifier). Either may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingState {
    #[serde(default)]
    pub setting: Option<String>,

    #[serde(default)]
    pub setting_name: Option<String>,

    #[serde(default)]
    pub state: String,
}

impl SettingState {
    /// Resolve the column name for this setting record
    ///
    /// Prefers `settingName`, falls back to `setting`; a record with neither
    /// (or only empty strings) contributes no column.
    pub fn column_name(&self) -> Option<&str> {
        self.setting_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.setting.as_deref().filter(|s| !s.is_empty()))
    }
}

/// List compliance policy states for one device
pub async fn list_policy_states(
    client: &GraphClient,
    device_id: &str,
) -> Result<Vec<PolicyState>> {
    client
        .get_all_pages(&format!(
            "deviceManagement/managedDevices/{}/deviceCompliancePolicyStates",
            device_id
        ))
        .await
}

/// List setting states for one policy on one device
pub async fn list_setting_states(
    client: &GraphClient,
    device_id: &str,
    policy_id: &str,
) -> Result<Vec<SettingState>> {
    client
        .get_all_pages(&format!(
            "deviceManagement/managedDevices/{}/deviceCompliancePolicyStates/{}/settingStates",
            device_id, policy_id
        ))
        .await
}

/// Graph-backed source for the report builder
pub struct GraphComplianceSource {
    client: GraphClient,
}

impl GraphComplianceSource {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ComplianceSource for GraphComplianceSource {
    async fn list_devices(&self, filter: Option<&str>) -> Result<Vec<ManagedDevice>> {
        devices::list_managed_devices(&self.client, filter).await
    }

    async fn policy_states(&self, device_id: &str) -> Result<Vec<PolicyState>> {
        list_policy_states(&self.client, device_id).await
    }

    async fn setting_states(
        &self,
        device_id: &str,
        policy_id: &str,
    ) -> Result<Vec<SettingState>> {
        list_setting_states(&self.client, device_id, policy_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(name: Option<&str>, fallback: Option<&str>) -> SettingState {
        SettingState {
            setting: fallback.map(String::from),
            setting_name: name.map(String::from),
            state: "compliant".into(),
        }
    }

    #[test]
    fn test_column_name_prefers_setting_name() {
        let s = setting(Some("BitLocker"), Some("windows10CompliancePolicy.bitLockerEnabled"));
        assert_eq!(s.column_name(), Some("BitLocker"));
    }

    #[test]
    fn test_column_name_falls_back_to_setting() {
        let s = setting(None, Some("windows10CompliancePolicy.bitLockerEnabled"));
        assert_eq!(
            s.column_name(),
            Some("windows10CompliancePolicy.bitLockerEnabled")
        );
    }

    #[test]
    fn test_column_name_skips_unnamed_and_empty() {
        assert_eq!(setting(None, None).column_name(), None);
        assert_eq!(setting(Some(""), Some("")).column_name(), None);
    }
}
