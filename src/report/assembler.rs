// SPDX-License-Identifier: PMPL-1.0-or-later

//! Evaluation report assembly from a completed attack run

use crate::types::*;

/// Build the normalized report for `target` from index-aligned kinds and results.
///
/// Execution times are floored to whole seconds.
pub fn assemble(
    target: &HoneypotTarget,
    kinds: &[AttackKind],
    results: &[AttackResult],
    successful_count: usize,
) -> EvaluationReport {
    let details = kinds
        .iter()
        .zip(results)
        .map(|(kind, result)| AttackDetail {
            attack_name: kind.clone(),
            vulnerability_found: result.vulnerability_found,
            message: result.message.clone(),
            execution_time_sec: result.execution_time_seconds.floor() as u64,
            details: kind.describe_detail(result.detail_metric),
        })
        .collect();

    EvaluationReport {
        analysis_type: ANALYSIS_TYPE_ACTIVE.to_string(),
        target: target.ip.clone(),
        details,
        total_attacks: kinds.len(),
        successful_attacks: successful_count,
    }
}
