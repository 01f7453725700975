//! Report building: schema discovery, row flattening, CSV export
//!
//! The compliance report has a dynamic column set (every setting name seen
//! anywhere in the fleet), so building is two sequential passes: discover the
//! global column set first, then materialize one row per device against that
//! frozen schema.

pub mod compliance;
pub mod export;
pub mod inactive;

use crate::error::Result;
use crate::graph::compliance::{PolicyState, SettingState};
use crate::graph::devices::ManagedDevice;
use async_trait::async_trait;

/// Cell value for a setting with no recorded state on a device
///
/// A literal string, not an empty cell: downstream consumers filter on it.
pub const SETTING_STATE_UNKNOWN: &str = "none";

/// Fixed identity prefix of every compliance report row
pub const IDENTITY_COLUMNS: [&str; 5] = [
    "DeviceName",
    "UserPrincipalName",
    "DeviceId",
    "ComplianceState",
    "LastSyncDateTime",
];

/// Source of devices and their compliance policy/setting states
///
/// The Graph client implements this for real runs; tests supply in-memory
/// sources with injected failures.
#[async_trait]
pub trait ComplianceSource: Send + Sync {
    /// List the managed devices in scope, optionally narrowed by an OData
    /// `$filter`. Failing here (or returning nothing) is fleet-fatal.
    async fn list_devices(&self, filter: Option<&str>) -> Result<Vec<ManagedDevice>>;

    /// Compliance policies applied to one device. May fail per device.
    async fn policy_states(&self, device_id: &str) -> Result<Vec<PolicyState>>;

    /// Setting states for one policy on one device. May fail per call.
    async fn setting_states(&self, device_id: &str, policy_id: &str)
        -> Result<Vec<SettingState>>;
}
