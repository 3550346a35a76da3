// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for honeyprobe

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Analysis type stamped on every active evaluation report
pub const ANALYSIS_TYPE_ACTIVE: &str = "Active";

/// Descriptor of the honeypot under evaluation, as produced by detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneypotTarget {
    pub name: String,
    pub version: String,
    pub ip: String,
    pub ports: BTreeSet<u16>,
}

impl HoneypotTarget {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        ip: impl Into<String>,
        ports: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ip: ip.into(),
            ports: ports.into_iter().collect(),
        }
    }
}

/// Attack kinds known to the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AttackKind {
    DenialOfService,
    Fuzzing,
    ArchiveBomb,
    /// Kinds added outside this crate; reported by name, without a detail label
    Custom(String),
}

impl AttackKind {
    pub fn name(&self) -> &str {
        match self {
            AttackKind::DenialOfService => "DoS",
            AttackKind::Fuzzing => "Fuzzing",
            AttackKind::ArchiveBomb => "TarBomb",
            AttackKind::Custom(name) => name,
        }
    }

    /// Label applied to a result's `detail_metric` in reports.
    pub fn detail_label(&self) -> Option<&'static str> {
        match self {
            AttackKind::DenialOfService => Some("Number of threads used"),
            AttackKind::Fuzzing => Some("Test cases executed"),
            AttackKind::ArchiveBomb => Some("Number of bombs used"),
            AttackKind::Custom(_) => None,
        }
    }

    pub fn describe_detail(&self, detail_metric: u64) -> Option<String> {
        self.detail_label()
            .map(|label| format!("{}: {}", label, detail_metric))
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<AttackKind> for String {
    fn from(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

impl From<String> for AttackKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "DoS" | "DoSAllOpenPorts" => AttackKind::DenialOfService,
            "Fuzzing" => AttackKind::Fuzzing,
            "TarBomb" => AttackKind::ArchiveBomb,
            _ => AttackKind::Custom(name),
        }
    }
}

/// How the orchestrator schedules modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// Outcome of one attack module execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    pub vulnerability_found: bool,
    pub message: String,
    pub execution_time_seconds: f64,
    pub detail_metric: u64,
}

impl AttackResult {
    pub fn new(
        vulnerability_found: bool,
        message: impl Into<String>,
        execution_time_seconds: f64,
        detail_metric: u64,
    ) -> Self {
        Self {
            vulnerability_found,
            message: message.into(),
            execution_time_seconds: clamp_seconds(execution_time_seconds),
            detail_metric,
        }
    }

    /// Failed result recorded in place of a module that errored, panicked or timed out.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::new(false, message, 0.0, 0)
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.execution_time_seconds = clamp_seconds(self.execution_time_seconds);
        self
    }
}

fn clamp_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Per-attack summary inside an evaluation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDetail {
    pub attack_name: AttackKind,
    pub vulnerability_found: bool,
    pub message: String,
    pub execution_time_sec: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Normalized outcome of one orchestration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub analysis_type: String,
    pub target: String,
    pub details: Vec<AttackDetail>,
    pub total_attacks: usize,
    pub successful_attacks: usize,
}

impl EvaluationReport {
    pub fn failed_attacks(&self) -> usize {
        self.total_attacks.saturating_sub(self.successful_attacks)
    }
}

/// Complete scan report handed to renderers and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub name: String,
    pub version: String,
    pub ip: String,
    pub ports: Vec<u16>,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive_results: Option<serde_json::Value>,
    pub active_results: EvaluationReport,
    pub all_cves: usize,
    pub success: usize,
    pub failed: usize,
    pub rating: String,
    pub recommendations: Vec<String>,
}
