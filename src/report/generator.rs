// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scan report generation: evaluation results plus target metadata, CVE count and advice

use crate::report::scorer;
use crate::types::*;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Source of the number of distinct CVEs known for the target
pub trait CveSource {
    fn count_unique_cves(&self) -> Result<usize>;
}

/// CVE identifiers listed one per line, as written by the passive analysis
pub struct CveFile {
    path: PathBuf,
}

impl CveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CveSource for CveFile {
    fn count_unique_cves(&self) -> Result<usize> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading CVE list {}", self.path.display()))?;
        let unique: HashSet<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Ok(unique.len())
    }
}

/// Fixed CVE count, for runs without passive results
pub struct KnownCveCount(pub usize);

impl CveSource for KnownCveCount {
    fn count_unique_cves(&self) -> Result<usize> {
        Ok(self.0)
    }
}

pub struct ReportGenerator<'a> {
    cves: &'a dyn CveSource,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(cves: &'a dyn CveSource) -> Self {
        Self { cves }
    }

    /// Fails with `EngineError::DivisionByZero` when the run had no attacks.
    pub fn generate(
        &self,
        target: &HoneypotTarget,
        active_results: EvaluationReport,
        passive_results: Option<serde_json::Value>,
    ) -> Result<ScanReport> {
        let rating = scorer::score(active_results.total_attacks, active_results.successful_attacks)?;
        let all_cves = self.cves.count_unique_cves()?;
        let recommendations = recommend(&active_results);
        info!(target = %target.ip, %rating, all_cves, "scan report generated");

        Ok(ScanReport {
            name: target.name.clone(),
            version: target.version.clone(),
            ip: target.ip.clone(),
            ports: target.ports.iter().copied().collect(),
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            passive_results,
            success: active_results.successful_attacks,
            failed: active_results.failed_attacks(),
            active_results,
            all_cves,
            rating,
            recommendations,
        })
    }
}

fn recommend(report: &EvaluationReport) -> Vec<String> {
    let mut recommendations = Vec::new();

    for detail in report.details.iter().filter(|d| d.vulnerability_found) {
        let advice = match &detail.attack_name {
            AttackKind::DenialOfService => format!(
                "Rate-limit new connections per source and cap concurrent sessions on {}",
                report.target
            ),
            AttackKind::Fuzzing => {
                "Bound and validate protocol input; malformed payloads took the honeypot offline"
                    .to_string()
            }
            AttackKind::ArchiveBomb => {
                "Enforce decompressed-size limits before unpacking uploaded archives".to_string()
            }
            AttackKind::Custom(name) => format!("Review the {} finding", name),
        };
        recommendations.push(advice);
    }

    if report.successful_attacks == 0 {
        recommendations.push(
            "No attack degraded the honeypot; keep it patched and re-run after upgrades".to_string(),
        );
    } else {
        recommendations.push(
            "Isolate the honeypot from production networks until the findings are fixed"
                .to_string(),
        );
    }

    recommendations
}
