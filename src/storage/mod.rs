// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persistent storage for scan reports

use crate::report::ReportOutputFormat;
use crate::types::ScanReport;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_REPORT_DIR: &str = "reports";

/// Write the report once per format; returns the created paths.
pub fn persist_report(
    report: &ScanReport,
    directory: Option<&Path>,
    formats: &[ReportOutputFormat],
) -> Result<Vec<PathBuf>> {
    let base_dir = directory
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));
    fs::create_dir_all(&base_dir)
        .with_context(|| format!("creating report directory {}", base_dir.display()))?;

    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let mut stored = Vec::with_capacity(formats.len());
    for format in formats {
        let path = base_dir.join(format!("honeyprobe-{}.{}", timestamp, format.extension()));
        let content = format.serialize(report)?;
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "report saved");
        stored.push(path);
    }

    Ok(stored)
}
