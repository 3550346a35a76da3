// SPDX-License-Identifier: PMPL-1.0-or-later

//! Success-rate scoring

use crate::error::{EngineError, Result};

/// Percentage of successful attacks, two decimals (`"25.00%"`).
///
/// Zero attacks means the module selection produced nothing, which is
/// surfaced instead of being reported as a 0% score.
pub fn score(total_attacks: usize, successful_attacks: usize) -> Result<String> {
    if total_attacks == 0 {
        return Err(EngineError::DivisionByZero);
    }
    let rate = successful_attacks as f64 / total_attacks as f64 * 100.0;
    Ok(format!("{:.2}%", rate))
}
