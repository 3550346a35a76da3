// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report assembly, scoring and output

pub mod assembler;
pub mod formatter;
pub mod generator;
pub mod output;
pub mod scorer;

use crate::types::*;
use anyhow::Result;

pub use assembler::assemble;
pub use formatter::ReportFormatter;
pub use generator::{CveFile, CveSource, KnownCveCount, ReportGenerator};
pub use output::ReportOutputFormat;
pub use scorer::score;

/// Turn a completed evaluation into a full scan report
pub fn generate_scan_report(
    target: &HoneypotTarget,
    evaluation: EvaluationReport,
    cves: &dyn CveSource,
    passive_results: Option<serde_json::Value>,
) -> Result<ScanReport> {
    let generator = ReportGenerator::new(cves);
    generator.generate(target, evaluation, passive_results)
}

/// Print report to console
pub fn print_report(report: &ScanReport) {
    let formatter = ReportFormatter::new();
    formatter.print(report);
}
