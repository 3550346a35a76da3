// SPDX-License-Identifier: PMPL-1.0-or-later

//! Honeyprobe: active security evaluation of deployed honeypots.
//!
//! Given a honeypot descriptor and its type, the engine selects the attack
//! modules that apply, runs them with per-module deadlines and fault
//! isolation, and assembles a normalized, scored evaluation report.
//!
//! PIPELINE:
//! 1. **Selection**: `attack::ModuleSelector` maps a honeypot type to an
//!    ordered module list.
//! 2. **Orchestration**: `attack::Orchestrator` runs the modules and keeps
//!    results index-aligned with the selection.
//! 3. **Reporting**: `report` assembles, scores and renders the outcome.

pub mod attack;
pub mod error;
pub mod report;
pub mod storage;
pub mod types;
