// SPDX-License-Identifier: PMPL-1.0-or-later

//! Caller-facing engine errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("report requested before the attack run completed ({completed}/{total} results)")]
    NotReady { completed: usize, total: usize },

    #[error("cannot score a run with zero attacks; check the module selection")]
    DivisionByZero,

    #[error("invalid scan profile: {0}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
