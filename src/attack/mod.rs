// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack modules and their orchestration

pub mod dos;
pub mod fuzzing;
pub mod orchestrator;
mod probe;
pub mod profile;
pub mod selector;
pub mod tar_bomb;

use crate::types::*;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub use dos::DenialOfService;
pub use fuzzing::Fuzzing;
pub use orchestrator::{ExecutionOptions, Orchestrator, RunState};
pub use profile::ScanProfile;
pub use selector::ModuleSelector;
pub use tar_bomb::TarBomb;

/// One adversarial probe run against a honeypot.
///
/// Modules hold a shared read-only handle to the target and never touch the
/// orchestrator or each other. `run` is called exactly once per orchestration
/// run, on a dedicated worker thread.
pub trait AttackModule: Send + Sync {
    fn kind(&self) -> AttackKind;

    /// Execute the attack. Once `stop` is raised the module must wind down,
    /// closing its sockets and joining any workers it spawned.
    fn run(&self, stop: &StopSignal) -> Result<AttackResult>;
}

/// Cooperative cancellation flag shared between the orchestrator and a module
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleep for `duration` in short slices; returns false if the signal was raised.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            if self.is_raised() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            thread::sleep(remaining.min(Duration::from_millis(25)));
        }
        !self.is_raised()
    }
}

/// Select, execute and assemble a complete evaluation for one honeypot.
pub fn run_assessment(
    target: HoneypotTarget,
    honeypot_type: &str,
    profile: &ScanProfile,
) -> crate::error::Result<EvaluationReport> {
    let target = Arc::new(target);
    let modules = ModuleSelector::new(profile).select(honeypot_type, &target);
    let mut orchestrator =
        Orchestrator::with_options(target, modules, ExecutionOptions::from(profile));
    orchestrator.run_all();
    orchestrator.generate_report()
}
