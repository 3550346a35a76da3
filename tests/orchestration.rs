// SPDX-License-Identifier: PMPL-1.0-or-later

//! End-to-end orchestration tests with scripted attack modules

use anyhow::{bail, Result};
use honeyprobe::attack::{
    self, AttackModule, ExecutionOptions, ModuleSelector, Orchestrator, RunState, ScanProfile,
    StopSignal,
};
use honeyprobe::error::EngineError;
use honeyprobe::types::*;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

enum Script {
    Report(AttackResult),
    Fail(&'static str),
    Panic(&'static str),
    Hang(Duration),
}

struct Scripted {
    kind: AttackKind,
    script: Script,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(kind: AttackKind, script: Script) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AttackModule for Scripted {
    fn kind(&self) -> AttackKind {
        self.kind.clone()
    }

    fn run(&self, stop: &StopSignal) -> Result<AttackResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Report(result) => Ok(result.clone()),
            Script::Fail(message) => bail!("{}", message),
            Script::Panic(message) => panic!("{}", message),
            Script::Hang(duration) => {
                stop.sleep(*duration);
                Ok(AttackResult::new(true, "woke up", 0.0, 0))
            }
        }
    }
}

fn target() -> Arc<HoneypotTarget> {
    Arc::new(HoneypotTarget::new("cowrie", "2.5.0", "10.0.0.5", [22, 23]))
}

fn options(mode: ExecutionMode) -> ExecutionOptions {
    ExecutionOptions {
        mode,
        module_timeout: Duration::from_secs(5),
        grace_period: Duration::from_millis(500),
    }
}

fn modules(list: Vec<Arc<Scripted>>) -> Vec<Arc<dyn AttackModule>> {
    list.into_iter()
        .map(|module| module as Arc<dyn AttackModule>)
        .collect()
}

fn full_battery(fuzz: bool, bomb: bool, dos: bool) -> Vec<Arc<dyn AttackModule>> {
    modules(vec![
        Scripted::new(
            AttackKind::Fuzzing,
            Script::Report(AttackResult::new(fuzz, "fuzzing finished", 12.7, 500)),
        ),
        Scripted::new(
            AttackKind::ArchiveBomb,
            Script::Report(AttackResult::new(bomb, "bombs delivered", 3.4, 5)),
        ),
        Scripted::new(
            AttackKind::DenialOfService,
            Script::Report(AttackResult::new(dos, "flood finished", 20.9, 16)),
        ),
    ])
}

#[test]
fn unconstrained_honeypot_with_one_finding() {
    let mut orchestrator = Orchestrator::with_options(
        target(),
        full_battery(false, true, false),
        options(ExecutionMode::Sequential),
    );
    orchestrator.run_all();
    let report = orchestrator.generate_report().expect("run completed");

    assert_eq!(report.analysis_type, "Active");
    assert_eq!(report.target, "10.0.0.5");
    assert_eq!(report.total_attacks, 3);
    assert_eq!(report.successful_attacks, 1);
    let names: Vec<_> = report
        .details
        .iter()
        .map(|d| d.attack_name.to_string())
        .collect();
    assert_eq!(names, vec!["Fuzzing", "TarBomb", "DoS"]);
    assert_eq!(report.details[0].execution_time_sec, 12);
    assert_eq!(
        report.details[0].details.as_deref(),
        Some("Test cases executed: 500")
    );
    assert_eq!(
        report.details[1].details.as_deref(),
        Some("Number of bombs used: 5")
    );
    assert_eq!(
        report.details[2].details.as_deref(),
        Some("Number of threads used: 16")
    );
}

#[test]
fn constrained_honeypot_runs_only_dos() {
    let profile = ScanProfile::default();
    let kinds = ModuleSelector::new(&profile).kinds("Dionaea");
    assert_eq!(kinds, vec![AttackKind::DenialOfService]);

    let dos = Scripted::new(
        AttackKind::DenialOfService,
        Script::Report(AttackResult::new(true, "service went down", 3.7, 8)),
    );
    let mut orchestrator = Orchestrator::with_options(
        target(),
        modules(vec![dos]),
        options(ExecutionMode::Sequential),
    );
    orchestrator.run_all();
    let report = orchestrator.generate_report().expect("run completed");

    assert_eq!(report.total_attacks, 1);
    assert_eq!(report.successful_attacks, 1);
    assert_eq!(report.failed_attacks(), 0);
    assert_eq!(report.details[0].execution_time_sec, 3);
    assert_eq!(
        report.details[0].details.as_deref(),
        Some("Number of threads used: 8")
    );
}

#[test]
fn failing_module_does_not_stop_the_run() {
    let after = Scripted::new(
        AttackKind::DenialOfService,
        Script::Report(AttackResult::new(true, "down", 1.0, 4)),
    );
    let list = vec![
        Scripted::new(AttackKind::Fuzzing, Script::Fail("connection refused")),
        Arc::clone(&after),
    ];
    let mut orchestrator =
        Orchestrator::with_options(target(), modules(list), options(ExecutionMode::Sequential));
    let results = orchestrator.run_all().to_vec();

    assert_eq!(results.len(), 2);
    assert!(!results[0].vulnerability_found);
    assert!(results[0].message.contains("connection refused"));
    assert_eq!(results[0].execution_time_seconds, 0.0);
    assert_eq!(after.calls(), 1);
    assert_eq!(orchestrator.successful_count(), 1);
}

#[test]
fn panicking_module_is_recorded_as_failure() {
    let list = vec![
        Scripted::new(AttackKind::ArchiveBomb, Script::Panic("archive writer exploded")),
        Scripted::new(
            AttackKind::DenialOfService,
            Script::Report(AttackResult::new(false, "survived", 2.0, 8)),
        ),
    ];
    let mut orchestrator =
        Orchestrator::with_options(target(), modules(list), options(ExecutionMode::Sequential));
    orchestrator.run_all();
    let report = orchestrator.generate_report().expect("run completed");

    assert_eq!(report.total_attacks, 2);
    assert!(!report.details[0].vulnerability_found);
    assert!(report.details[0].message.contains("archive writer exploded"));
    assert_eq!(report.details[1].message, "survived");
}

#[test]
fn overrunning_module_times_out() {
    let slow = Scripted::new(AttackKind::Fuzzing, Script::Hang(Duration::from_secs(30)));
    let mut opts = options(ExecutionMode::Sequential);
    opts.module_timeout = Duration::from_millis(200);

    let mut orchestrator = Orchestrator::with_options(target(), modules(vec![slow]), opts);
    let started = Instant::now();
    orchestrator.run_all();
    assert!(started.elapsed() < Duration::from_secs(5));

    let result = &orchestrator.results()[0];
    assert!(!result.vulnerability_found);
    assert!(result.message.contains("timed out"));
    assert_eq!(orchestrator.successful_count(), 0);
}

fn run_after_timeout(mode: ExecutionMode) {
    let after = Scripted::new(
        AttackKind::DenialOfService,
        Script::Report(AttackResult::new(false, "flood absorbed", 1.2, 16)),
    );
    let list = vec![
        Scripted::new(AttackKind::Fuzzing, Script::Hang(Duration::from_secs(30))),
        Arc::clone(&after),
    ];
    let mut opts = options(mode);
    opts.module_timeout = Duration::from_millis(200);

    let mut orchestrator = Orchestrator::with_options(target(), modules(list), opts);
    let results = orchestrator.run_all().to_vec();

    assert_eq!(results.len(), 2);
    assert!(results[0].message.contains("timed out"));
    assert_eq!(
        results[1],
        AttackResult::new(false, "flood absorbed", 1.2, 16)
    );
    assert_eq!(after.calls(), 1);
}

#[test]
fn module_after_timeout_still_runs_sequentially() {
    run_after_timeout(ExecutionMode::Sequential);
}

#[test]
fn module_after_timeout_still_runs_in_parallel() {
    run_after_timeout(ExecutionMode::Parallel);
}

#[test]
fn generic_honeypot_with_faulting_fuzzer() {
    let profile = ScanProfile::default();
    let kinds = ModuleSelector::new(&profile).kinds("generic");
    assert_eq!(
        kinds,
        vec![
            AttackKind::Fuzzing,
            AttackKind::ArchiveBomb,
            AttackKind::DenialOfService
        ]
    );

    let list: Vec<Arc<Scripted>> = kinds
        .into_iter()
        .map(|kind| {
            let script = match kind {
                AttackKind::Fuzzing => Script::Fail("fuzzer lost its socket"),
                AttackKind::ArchiveBomb => {
                    Script::Report(AttackResult::new(false, "bombs absorbed", 6.5, 5))
                }
                _ => Script::Report(AttackResult::new(true, "service went down", 20.2, 16)),
            };
            Scripted::new(kind, script)
        })
        .collect();
    let mut orchestrator = Orchestrator::with_options(
        target(),
        modules(list.clone()),
        options(ExecutionMode::Sequential),
    );
    orchestrator.run_all();
    let report = orchestrator.generate_report().expect("run completed");

    assert_eq!(report.total_attacks, 3);
    assert_eq!(report.successful_attacks, 1);
    assert!(!report.details[0].vulnerability_found);
    assert!(!report.details[0].message.is_empty());
    assert_eq!(report.details[0].execution_time_sec, 0);
    assert_eq!(report.details[1].message, "bombs absorbed");
    assert_eq!(report.details[1].execution_time_sec, 6);
    assert_eq!(
        report.details[1].details.as_deref(),
        Some("Number of bombs used: 5")
    );
    assert!(report.details[2].vulnerability_found);
    assert_eq!(
        report.details[2].details.as_deref(),
        Some("Number of threads used: 16")
    );
    assert!(list.iter().all(|module| module.calls() == 1));
}

#[test]
fn report_before_run_is_not_ready() {
    let orchestrator = Orchestrator::with_options(
        target(),
        full_battery(true, true, true),
        options(ExecutionMode::Sequential),
    );
    assert_eq!(orchestrator.state(), RunState::Idle);
    assert_eq!(
        orchestrator.generate_report(),
        Err(EngineError::NotReady {
            completed: 0,
            total: 3
        })
    );
}

#[test]
fn repeated_report_generation_is_identical() {
    let mut orchestrator = Orchestrator::with_options(
        target(),
        full_battery(true, false, true),
        options(ExecutionMode::Sequential),
    );
    orchestrator.run_all();
    let first = orchestrator.generate_report().expect("first report");
    let second = orchestrator.generate_report().expect("second report");
    assert_eq!(first, second);
}

#[test]
fn second_run_reuses_results() {
    let dos = Scripted::new(
        AttackKind::DenialOfService,
        Script::Report(AttackResult::new(true, "down", 1.0, 2)),
    );
    let mut orchestrator = Orchestrator::with_options(
        target(),
        modules(vec![Arc::clone(&dos)]),
        options(ExecutionMode::Sequential),
    );
    orchestrator.run_all();
    orchestrator.run_all();

    assert_eq!(dos.calls(), 1);
    assert_eq!(orchestrator.results().len(), 1);
    assert_eq!(orchestrator.successful_count(), 1);
    assert_eq!(orchestrator.state(), RunState::Complete);
}

#[test]
fn parallel_run_keeps_selection_order() {
    let list = vec![
        Scripted::new(AttackKind::Fuzzing, Script::Hang(Duration::from_millis(300))),
        Scripted::new(
            AttackKind::ArchiveBomb,
            Script::Report(AttackResult::new(false, "bombs absorbed", 0.5, 5)),
        ),
        Scripted::new(AttackKind::DenialOfService, Script::Fail("no live ports")),
    ];
    let mut orchestrator =
        Orchestrator::with_options(target(), modules(list), options(ExecutionMode::Parallel));
    orchestrator.run_all();
    let report = orchestrator.generate_report().expect("run completed");

    let names: Vec<_> = report
        .details
        .iter()
        .map(|d| d.attack_name.clone())
        .collect();
    assert_eq!(
        names,
        vec![
            AttackKind::Fuzzing,
            AttackKind::ArchiveBomb,
            AttackKind::DenialOfService
        ]
    );
    assert_eq!(report.details[0].message, "woke up");
    assert_eq!(report.details[1].message, "bombs absorbed");
    assert!(report.details[2].message.contains("no live ports"));
    assert_eq!(report.successful_attacks, 1);
}

#[test]
fn successful_count_matches_flagged_results() {
    for (fuzz, bomb, dos) in [(false, false, false), (true, false, true), (true, true, true)] {
        let mut orchestrator = Orchestrator::with_options(
            target(),
            full_battery(fuzz, bomb, dos),
            options(ExecutionMode::Parallel),
        );
        let flagged = orchestrator
            .run_all()
            .iter()
            .filter(|r| r.vulnerability_found)
            .count();
        assert_eq!(orchestrator.successful_count(), flagged);
        assert!(orchestrator.successful_count() <= orchestrator.total_attacks());
    }
}

#[test]
fn identical_inputs_produce_identical_reports() {
    let run = || {
        let mut orchestrator = Orchestrator::with_options(
            target(),
            full_battery(false, true, true),
            options(ExecutionMode::Sequential),
        );
        orchestrator.run_all();
        orchestrator.generate_report().expect("run completed")
    };
    assert_eq!(run(), run());
}

#[test]
fn assessment_against_closed_port_records_failures() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        listener.local_addr().expect("local addr").port()
    };
    let mut profile = ScanProfile::default();
    profile.connect_timeout_ms = 200;

    let target = HoneypotTarget::new("conpot", "0.6.0", "127.0.0.1", [port]);
    let report = attack::run_assessment(target, "conpot", &profile).expect("run completed");

    assert_eq!(report.total_attacks, 1);
    assert_eq!(report.successful_attacks, 0);
    assert_eq!(report.details[0].attack_name, AttackKind::DenialOfService);
    assert!(!report.details[0].vulnerability_found);
}
