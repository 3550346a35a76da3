// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report formatting and console output

use crate::types::*;
use colored::*;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &ScanReport) {
        println!("\n{}", "=== HONEYPROBE EVALUATION REPORT ===".bold().cyan());
        println!();

        self.print_target(report);
        println!();

        self.print_attack_summary(&report.active_results);
        println!();

        self.print_overall_assessment(report);
        println!();
    }

    fn print_target(&self, report: &ScanReport) {
        println!("{}", "TARGET".bold().yellow());
        println!("  Honeypot: {} {}", report.name, report.version);
        println!("  Address: {}", report.ip);
        let ports: Vec<String> = report.ports.iter().map(|p| p.to_string()).collect();
        println!("  Ports: {}", ports.join(", "));
        println!("  Scanned: {}", report.date);
        println!("  Known CVEs: {}", report.all_cves);
    }

    fn print_attack_summary(&self, evaluation: &EvaluationReport) {
        println!(
            "{} ({})",
            "ATTACK RESULTS".bold().yellow(),
            evaluation.analysis_type
        );

        for detail in &evaluation.details {
            let status = if detail.vulnerability_found {
                "VULNERABLE".red().bold()
            } else {
                "RESISTED".green()
            };

            println!(
                "  {} attack: {} ({}s)",
                detail.attack_name, status, detail.execution_time_sec
            );
            println!("    {}", detail.message.dimmed());
            if let Some(extra) = &detail.details {
                println!("    {}", extra);
            }
        }
    }

    fn print_overall_assessment(&self, report: &ScanReport) {
        println!("{}", "OVERALL ASSESSMENT".bold().yellow());

        let rate = report
            .rating
            .trim_end_matches('%')
            .parse::<f64>()
            .unwrap_or(0.0);
        let rating_color = if rate == 0.0 {
            "green"
        } else if rate < 50.0 {
            "yellow"
        } else {
            "red"
        };

        println!(
            "  Successful attacks: {}  |  Failed attacks: {}",
            report.success, report.failed
        );
        println!(
            "  Attack success rate: {}",
            report.rating.color(rating_color).bold()
        );
        println!();

        if !report.recommendations.is_empty() {
            println!("  Recommendations:");
            for rec in &report.recommendations {
                println!("    - {}", rec);
            }
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
