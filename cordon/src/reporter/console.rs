// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Reporter;
use crate::protocol::TestStatus;
use crate::runner::{RunSummary, TestResult};
use owo_colors::{OwoColorize, Style};

/// Human-readable reporter printing colored status lines to standard
/// output.
pub struct ConsoleReporter {
    errors_only: bool,
}

impl ConsoleReporter {
    /// Creates a console reporter. With `errors_only`, passing tests and
    /// suite headers are suppressed; failures and the summary are still
    /// printed.
    pub fn new(errors_only: bool) -> Self {
        Self { errors_only }
    }
}

impl Reporter for ConsoleReporter {
    fn suite_started(&self, suite_path: &str) {
        if !self.errors_only {
            println!("{} {}", "Suite".bold(), suite_path);
        }
    }

    fn test_started(&self, qualified_path: &str) {
        if !self.errors_only {
            println!("{} {}", format!("{:>12}", "START").dimmed(), qualified_path);
        }
    }

    fn test_finished(&self, result: &TestResult) {
        if self.errors_only && result.status.is_pass() {
            return;
        }
        println!(
            "{} [{:>9.3}s] {}",
            styled_label(result.status),
            result.duration.as_secs_f64(),
            result.qualified_path,
        );
        for line in result.description.lines() {
            println!("             {line}");
        }
    }

    fn summary(&self, summary: &RunSummary) {
        println!();
        println!(
            "{}: {} tests run, {} passed, {} did not pass",
            "Summary".bold(),
            summary.initial_run_count,
            summary.passed,
            summary.failures.len(),
        );
        for (status, qualified_path) in &summary.failures {
            println!("{} {}", styled_label(*status), qualified_path);
        }
    }
}

fn styled_label(status: TestStatus) -> String {
    let (label, style) = match status {
        TestStatus::Passed => ("PASS", Style::new().green().bold()),
        TestStatus::Failed => ("FAIL", Style::new().red().bold()),
        TestStatus::Crashed => ("CRASH", Style::new().red().bold()),
        TestStatus::TimedOut => ("TIMEOUT", Style::new().yellow().bold()),
        TestStatus::NotFound => ("MISSING", Style::new().yellow().bold()),
    };
    // Pad before styling: the escape codes would otherwise count toward
    // the field width.
    format!("{:>12}", label).style(style).to_string()
}
