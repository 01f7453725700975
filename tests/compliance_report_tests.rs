//! End-to-end compliance report pipeline against a mock Graph server
//!
//! Covers the full path: paginated device listing, per-device policy and
//! setting fetches, column discovery, row building, and CSV export.

use rpt365::graph::compliance::GraphComplianceSource;
use rpt365::graph::GraphClient;
use rpt365::report::compliance::build_compliance_report;
use rpt365::report::export::write_compliance_csv;
use rpt365::report::{ComplianceSource, SETTING_STATE_UNKNOWN};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> GraphComplianceSource {
    GraphComplianceSource::new(GraphClient::with_base_url(
        "test-token".into(),
        format!("{}/v1.0", server.uri()),
    ))
}

fn device_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "deviceName": name,
        "userPrincipalName": format!("{}@contoso.com", name.to_lowercase()),
        "complianceState": "compliant",
        "operatingSystem": "Windows",
        "lastSyncDateTime": "2026-08-20T08:00:00Z"
    })
}

async fn mount_policy(
    server: &MockServer,
    device_id: &str,
    policy_id: &str,
    settings: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/v1.0/deviceManagement/managedDevices/{}/deviceCompliancePolicyStates",
            device_id
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": policy_id, "displayName": "Baseline", "state": "compliant"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/v1.0/deviceManagement/managedDevices/{}/deviceCompliancePolicyStates/{}/settingStates",
            device_id, policy_id
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "value": settings })),
        )
        .mount(server)
        .await;
}

/// Two healthy devices across two device-listing pages plus one device whose
/// per-device fetch keeps failing.
async fn mount_fleet(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1.0/deviceManagement/managedDevices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [device_json("dev-a", "LAPTOP-A"), device_json("dev-bad", "LAPTOP-BAD")],
            "@odata.nextLink": format!("{}/v1.0/devicesPage2", server.uri())
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/devicesPage2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [device_json("dev-b", "LAPTOP-B")]
        })))
        .mount(server)
        .await;

    mount_policy(
        server,
        "dev-a",
        "pol-1",
        serde_json::json!([
            {"settingName": "BitLocker", "state": "compliant"}
        ]),
    )
    .await;

    mount_policy(
        server,
        "dev-b",
        "pol-2",
        serde_json::json!([
            {"settingName": "BitLocker", "state": "error"},
            {"settingName": "Firewall", "state": "compliant"},
            // fallback name field only
            {"setting": "windows10CompliancePolicy.passwordRequired", "state": "compliant"},
            // no resolvable name: contributes nothing
            {"state": "error"}
        ]),
    )
    .await;

    // 404 is not retried, so both passes fail fast for this device
    Mock::given(method("GET"))
        .and(path(
            "/v1.0/deviceManagement/managedDevices/dev-bad/deviceCompliancePolicyStates",
        ))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": "Request_ResourceNotFound", "message": "Not found."}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline_with_fault_isolation() {
    let server = MockServer::start().await;
    mount_fleet(&server).await;

    let source = source_for(&server);
    let report = build_compliance_report(&source, None).await.unwrap();

    // columns: global, deduplicated, sorted
    assert_eq!(
        report.columns,
        vec![
            "BitLocker",
            "Firewall",
            "windows10CompliancePolicy.passwordRequired"
        ]
    );

    // one row per listed device, in listing order, across pages
    let names: Vec<&str> = report.rows.iter().map(|r| r.device_name.as_str()).collect();
    assert_eq!(names, vec!["LAPTOP-A", "LAPTOP-BAD", "LAPTOP-B"]);

    // healthy devices carry their states, absent settings stay at the sentinel
    assert_eq!(report.rows[0].settings, vec!["compliant", "none", "none"]);
    assert_eq!(report.rows[2].settings, vec!["error", "compliant", "compliant"]);

    // failing device keeps identity fields and all-sentinel cells
    let bad = &report.rows[1];
    assert_eq!(bad.user_principal_name, "laptop-bad@contoso.com");
    assert!(bad.settings.iter().all(|s| s == SETTING_STATE_UNKNOWN));

    // one warning per pass naming the device
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings.iter().all(|w| w.contains("LAPTOP-BAD")));
}

#[tokio::test]
async fn test_exported_csv_is_rectangular() {
    let server = MockServer::start().await;
    mount_fleet(&server).await;

    let source = source_for(&server);
    let report = build_compliance_report(&source, None).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("compliance.csv");
    write_compliance_csv(&report, &csv_path).unwrap();

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4); // header + 3 devices

    assert_eq!(
        lines[0],
        "DeviceName,UserPrincipalName,DeviceId,ComplianceState,LastSyncDateTime,\
         BitLocker,Firewall,windows10CompliancePolicy.passwordRequired"
    );

    // every row has the full column set; the failing device exports sentinels
    let field_count = lines[0].split(',').count();
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), field_count);
    }
    assert!(lines[2].contains("LAPTOP-BAD"));
    assert!(lines[2].ends_with("none,none,none"));
}

#[tokio::test]
async fn test_discovery_failure_recovers_during_row_build() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/deviceManagement/managedDevices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [device_json("dev-a", "LAPTOP-A"), device_json("dev-d", "LAPTOP-D")]
        })))
        .mount(&server)
        .await;

    mount_policy(
        &server,
        "dev-a",
        "pol-1",
        serde_json::json!([
            {"settingName": "BitLocker", "state": "compliant"}
        ]),
    )
    .await;

    // dev-d's policy fetch fails exactly once: the discovery pass sees the
    // 404, the row-building pass gets real data
    Mock::given(method("GET"))
        .and(path(
            "/v1.0/deviceManagement/managedDevices/dev-d/deviceCompliancePolicyStates",
        ))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": "Request_ResourceNotFound", "message": "Not found."}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    mount_policy(
        &server,
        "dev-d",
        "pol-d",
        serde_json::json!([
            {"settingName": "BitLocker", "state": "error"}
        ]),
    )
    .await;

    let source = source_for(&server);
    let report = build_compliance_report(&source, None).await.unwrap();

    // dev-d contributed no columns, but the healthy device's survive
    assert_eq!(report.columns, vec!["BitLocker"]);

    // the second fetch succeeded, so dev-d's row carries real state
    assert_eq!(report.rows[1].device_name, "LAPTOP-D");
    assert_eq!(report.rows[1].settings, vec!["error"]);

    // only the discovery pass warned
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("LAPTOP-D"));
    assert!(report.warnings[0].contains("schema discovery"));
}

#[tokio::test]
async fn test_zero_devices_aborts_without_export() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/deviceManagement/managedDevices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })),
        )
        .mount(&server)
        .await;

    let source = source_for(&server);
    let err = build_compliance_report(&source, None).await.unwrap_err();
    assert!(matches!(err, rpt365::error::Rpt365Error::NoDevices));
}

#[tokio::test]
async fn test_device_filter_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/deviceManagement/managedDevices"))
        .and(wiremock::matchers::query_param(
            "$filter",
            "operatingSystem eq 'Windows'",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [device_json("dev-a", "LAPTOP-A")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server);
    let devices = source
        .list_devices(Some("operatingSystem eq 'Windows'"))
        .await
        .unwrap();
    assert_eq!(devices.len(), 1);
}
