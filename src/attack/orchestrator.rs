// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack orchestration engine

use crate::attack::profile::ScanProfile;
use crate::attack::{AttackModule, StopSignal};
use crate::error::{EngineError, Result};
use crate::report::assembler;
use crate::types::*;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub mode: ExecutionMode,
    /// Deadline for a single module; overruns are recorded as faults.
    pub module_timeout: Duration,
    /// How long a timed-out module gets to acknowledge its stop signal.
    pub grace_period: Duration,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        ExecutionOptions::from(&ScanProfile::default())
    }
}

impl From<&ScanProfile> for ExecutionOptions {
    fn from(profile: &ScanProfile) -> Self {
        Self {
            mode: profile.execution,
            module_timeout: profile.module_timeout(),
            grace_period: profile.grace_period(),
        }
    }
}

type WorkerOutcome = thread::Result<anyhow::Result<AttackResult>>;

/// One scan session: the selected modules and the results they produced.
pub struct Orchestrator {
    target: Arc<HoneypotTarget>,
    modules: Vec<Arc<dyn AttackModule>>,
    results: Vec<AttackResult>,
    successful_count: usize,
    state: RunState,
    options: ExecutionOptions,
}

impl Orchestrator {
    pub fn new(target: Arc<HoneypotTarget>, modules: Vec<Arc<dyn AttackModule>>) -> Self {
        Self::with_options(target, modules, ExecutionOptions::default())
    }

    pub fn with_options(
        target: Arc<HoneypotTarget>,
        modules: Vec<Arc<dyn AttackModule>>,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            target,
            results: Vec::with_capacity(modules.len()),
            modules,
            successful_count: 0,
            state: RunState::Idle,
            options,
        }
    }

    pub fn kinds(&self) -> Vec<AttackKind> {
        self.modules.iter().map(|module| module.kind()).collect()
    }

    pub fn results(&self) -> &[AttackResult] {
        &self.results
    }

    pub fn total_attacks(&self) -> usize {
        self.modules.len()
    }

    pub fn successful_count(&self) -> usize {
        self.successful_count
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every module once, in selection order. A completed run is left as is.
    pub fn run_all(&mut self) -> &[AttackResult] {
        if self.state == RunState::Complete {
            debug!(target = %self.target.ip, "attack run already complete; reusing results");
            return &self.results;
        }

        self.state = RunState::Running;
        info!(
            target = %self.target.ip,
            attacks = self.modules.len(),
            mode = ?self.options.mode,
            "starting attack run"
        );

        match self.options.mode {
            ExecutionMode::Sequential => {
                for idx in 0..self.modules.len() {
                    let module = Arc::clone(&self.modules[idx]);
                    let result = execute_guarded(&module, &self.options);
                    self.record(&module.kind(), result);
                }
            }
            ExecutionMode::Parallel => {
                let options = self.options;
                // collect() keeps module order regardless of completion order
                let outcomes: Vec<AttackResult> = self
                    .modules
                    .par_iter()
                    .map(|module| execute_guarded(module, &options))
                    .collect();
                for (kind, result) in self.kinds().iter().zip(outcomes) {
                    self.record(kind, result);
                }
            }
        }

        self.state = RunState::Complete;
        info!(
            target = %self.target.ip,
            total = self.modules.len(),
            successful = self.successful_count,
            "attack run complete"
        );
        &self.results
    }

    /// Build the evaluation report; only valid once `run_all` has completed.
    pub fn generate_report(&self) -> Result<EvaluationReport> {
        if self.state != RunState::Complete || self.results.len() != self.modules.len() {
            return Err(EngineError::NotReady {
                completed: self.results.len(),
                total: self.modules.len(),
            });
        }
        Ok(assembler::assemble(
            &self.target,
            &self.kinds(),
            &self.results,
            self.successful_count,
        ))
    }

    fn record(&mut self, kind: &AttackKind, result: AttackResult) {
        if result.vulnerability_found {
            self.successful_count += 1;
        }
        info!(
            attack = %kind,
            vulnerable = result.vulnerability_found,
            seconds = result.execution_time_seconds,
            "attack finished"
        );
        self.results.push(result);
    }
}

/// Run one module on its own worker thread under the configured deadline.
/// Errors, panics and overruns all come back as failed results.
fn execute_guarded(module: &Arc<dyn AttackModule>, options: &ExecutionOptions) -> AttackResult {
    let kind = module.kind();
    info!(attack = %kind, "running attack");

    let stop = StopSignal::new();
    let (tx, rx) = mpsc::channel::<WorkerOutcome>();
    let worker = {
        let module = Arc::clone(module);
        let stop = stop.clone();
        thread::Builder::new()
            .name(format!("attack-{}", kind.name().to_lowercase()))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| module.run(&stop)));
                let _ = tx.send(outcome);
            })
    };
    let worker = match worker {
        Ok(handle) => handle,
        Err(err) => return fault(&kind, format!("could not start attack worker: {}", err)),
    };

    match rx.recv_timeout(options.module_timeout) {
        Ok(outcome) => {
            let _ = worker.join();
            convert(&kind, outcome)
        }
        Err(RecvTimeoutError::Timeout) => {
            stop.raise();
            match rx.recv_timeout(options.grace_period) {
                Ok(_) => {
                    let _ = worker.join();
                }
                Err(_) => warn!(attack = %kind, "worker ignored stop signal; detaching it"),
            }
            fault(
                &kind,
                format!(
                    "{} attack timed out after {:?}",
                    kind, options.module_timeout
                ),
            )
        }
        Err(RecvTimeoutError::Disconnected) => {
            let _ = worker.join();
            fault(&kind, "attack worker exited without a result".to_string())
        }
    }
}

fn convert(kind: &AttackKind, outcome: WorkerOutcome) -> AttackResult {
    match outcome {
        Ok(Ok(result)) => result.normalized(),
        Ok(Err(err)) => fault(kind, format!("{:#}", err)),
        Err(payload) => fault(
            kind,
            format!("{} attack panicked: {}", kind, panic_message(payload.as_ref())),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn fault(kind: &AttackKind, message: String) -> AttackResult {
    let message = if message.trim().is_empty() {
        format!("{} attack failed", kind)
    } else {
        message
    };
    warn!(attack = %kind, error = %message, "attack faulted; recording as failed");
    AttackResult::fault(message)
}
