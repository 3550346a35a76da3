// SPDX-License-Identifier: PMPL-1.0-or-later

//! honeyprobe: run the active attack battery against a honeypot
//!
//! Selects the attacks that apply to the honeypot type, runs them with
//! per-attack deadlines, then prints and stores a scored evaluation report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use honeyprobe::attack::{ExecutionOptions, ModuleSelector, Orchestrator, ScanProfile};
use honeyprobe::report::{self, CveFile, CveSource, KnownCveCount, ReportOutputFormat};
use honeyprobe::storage;
use honeyprobe::types::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "honeyprobe")]
#[command(version)]
#[command(about = "Active attack battery and scored evaluation reports for honeypots")]
#[command(long_about = None)]
struct Cli {
    /// Only log warnings and skip the console report
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the attack battery against a honeypot
    Scan {
        /// Address of the honeypot
        #[arg(long, value_parser = parse_sanitized)]
        target_ip: String,

        /// Honeypot type reported by detection (cowrie, dionaea, conpot, ...)
        #[arg(long, value_parser = parse_sanitized)]
        honeypot_type: String,

        /// Honeypot name for the report (defaults to the type)
        #[arg(long)]
        name: Option<String>,

        /// Honeypot version for the report
        #[arg(long, default_value = "unknown")]
        version: String,

        /// Open ports to attack
        #[arg(short, long, value_delimiter = ',', required = true)]
        ports: Vec<u16>,

        /// Scan profile (JSON or YAML)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Run attacks concurrently
        #[arg(long)]
        parallel: bool,

        /// Per-attack timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// CVE list produced by passive analysis, one identifier per line
        #[arg(long)]
        cves: Option<PathBuf>,

        /// Directory for stored reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Stored report formats
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "json")]
        format: Vec<ReportOutputFormat>,
    },

    /// Show which attacks would run against a honeypot type
    Plan {
        /// Honeypot type reported by detection
        #[arg(long, value_parser = parse_sanitized)]
        honeypot_type: String,

        /// Scan profile (JSON or YAML)
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

/// Trim, lowercase and strip everything outside `[a-z0-9._- ]`.
fn parse_sanitized(value: &str) -> std::result::Result<String, String> {
    let pattern = Regex::new(r"[^a-z0-9._\- ]").map_err(|e| e.to_string())?;
    let lowered = value.trim().to_lowercase();
    let cleaned = pattern.replace_all(&lowered, "").into_owned();
    if cleaned.is_empty() {
        Err(format!("{:?} is empty after sanitizing", value))
    } else {
        Ok(cleaned)
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_profile(path: Option<&Path>) -> Result<ScanProfile> {
    match path {
        Some(path) => ScanProfile::load(path),
        None => Ok(ScanProfile::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let quiet = cli.quiet;
    init_tracing(quiet);

    match cli.command {
        Commands::Scan {
            target_ip,
            honeypot_type,
            name,
            version,
            ports,
            profile,
            parallel,
            timeout,
            cves,
            output_dir,
            format,
        } => {
            let mut profile = load_profile(profile.as_deref())?;
            if parallel {
                profile.execution = ExecutionMode::Parallel;
            }
            if let Some(secs) = timeout {
                profile.module_timeout_secs = secs;
            }
            profile.validate()?;

            let target = Arc::new(HoneypotTarget::new(
                name.unwrap_or_else(|| honeypot_type.clone()),
                version,
                target_ip,
                ports,
            ));
            let modules = ModuleSelector::new(&profile).select(&honeypot_type, &target);
            info!(
                target = %target.ip,
                honeypot_type = %honeypot_type,
                attacks = modules.len(),
                "attacks selected"
            );

            let mut orchestrator = Orchestrator::with_options(
                Arc::clone(&target),
                modules,
                ExecutionOptions::from(&profile),
            );
            orchestrator.run_all();
            let evaluation = orchestrator.generate_report()?;

            let cve_source: Box<dyn CveSource> = match cves {
                Some(path) => Box::new(CveFile::new(path)),
                None => Box::new(KnownCveCount(0)),
            };
            let scan_report =
                report::generate_scan_report(&target, evaluation, cve_source.as_ref(), None)?;

            if !quiet {
                report::print_report(&scan_report);
            }

            let stored = storage::persist_report(&scan_report, output_dir.as_deref(), &format)?;
            for path in stored {
                println!("Report saved to: {}", path.display());
            }
        }

        Commands::Plan {
            honeypot_type,
            profile,
        } => {
            let profile = load_profile(profile.as_deref())?;
            let kinds = ModuleSelector::new(&profile).kinds(&honeypot_type);
            println!("Attacks selected for {}:", honeypot_type);
            for (idx, kind) in kinds.iter().enumerate() {
                let label = kind.detail_label().unwrap_or("-");
                println!("  {}. {} (reports: {})", idx + 1, kind, label);
            }
        }
    }

    Ok(())
}
