//! CSV export with atomic writes
//!
//! The report is serialized fully in memory, written to a temp file next to
//! the target, then renamed into place. A failed export never leaves a
//! previous export truncated.

use crate::error::{Result, Rpt365Error};
use crate::report::compliance::ComplianceReport;
use crate::report::inactive::{InactiveDeviceRow, INACTIVE_COLUMNS};
use crate::report::IDENTITY_COLUMNS;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Write the compliance report to `path`
///
/// Header = identity columns + discovered setting columns, in report order.
pub fn write_compliance_csv(report: &ComplianceReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = IDENTITY_COLUMNS.to_vec();
    header.extend(report.columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &report.rows {
        writer.write_record(row.record())?;
    }

    write_atomic(path, &into_bytes(writer)?)
}

/// Write the inactive device report to `path`
pub fn write_inactive_csv(rows: &[InactiveDeviceRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(INACTIVE_COLUMNS)?;
    for row in rows {
        writer.write_record(row.record())?;
    }

    write_atomic(path, &into_bytes(writer)?)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| Rpt365Error::ExportError(e.to_string()))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Rpt365Error::ExportError(format!("Invalid path: {}", path.display())))?;

    let mut tmp_name = OsString::from(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = fs::write(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, path));
    if result.is_err() {
        // don't leave a stray .tmp next to the target
        let _ = fs::remove_file(&tmp_path);
    }
    Ok(result?)
}
