// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting the progress and results of a test run.
//!
//! The runner delivers start/finish events and the final summary to a
//! [`Reporter`]. Multiple reporters can be selected for one run; they
//! are fanned out through [`CombinedReporter`]. With more than one
//! worker, the runner serializes each test's started/finished pair so
//! pairs from concurrently finishing tests never interleave.

mod console;
mod subprocess;

pub use console::ConsoleReporter;
pub use subprocess::SubprocessReporter;

use crate::errors::UnknownReporterError;
use crate::runner::{RunSummary, TestResult};

/// A sink for test run events.
///
/// All methods have no-op defaults so a reporter only implements the
/// events it cares about.
pub trait Reporter: Send + Sync {
    /// Called when an in-scope suite is entered, before any of its child
    /// suites or tests run. Pruned suites receive no notification.
    fn suite_started(&self, _suite_path: &str) {}

    /// Called after all of a suite's child suites and own tests have
    /// completed.
    fn suite_finished(&self, _suite_path: &str) {}

    /// Called when a test case is dispatched.
    fn test_started(&self, _qualified_path: &str) {}

    /// Called with the single result produced for a dispatched test case.
    fn test_finished(&self, _result: &TestResult) {}

    /// Called once at the end of the run.
    fn summary(&self, _summary: &RunSummary) {}
}

/// Fans events out to every selected reporter, in selection order.
pub struct CombinedReporter {
    reporters: Vec<Box<dyn Reporter>>,
}

impl CombinedReporter {
    /// Creates a combined reporter from individual reporters.
    pub fn new(reporters: Vec<Box<dyn Reporter>>) -> Self {
        Self { reporters }
    }
}

impl Reporter for CombinedReporter {
    fn suite_started(&self, suite_path: &str) {
        for reporter in &self.reporters {
            reporter.suite_started(suite_path);
        }
    }

    fn suite_finished(&self, suite_path: &str) {
        for reporter in &self.reporters {
            reporter.suite_finished(suite_path);
        }
    }

    fn test_started(&self, qualified_path: &str) {
        for reporter in &self.reporters {
            reporter.test_started(qualified_path);
        }
    }

    fn test_finished(&self, result: &TestResult) {
        for reporter in &self.reporters {
            reporter.test_finished(result);
        }
    }

    fn summary(&self, summary: &RunSummary) {
        for reporter in &self.reporters {
            reporter.summary(summary);
        }
    }
}

/// Builds reporters from their command-line names.
///
/// Known names are `console` and `subprocess`. `errors_only` restricts
/// the console reporter to failures and the summary.
pub fn reporters_by_name<'a>(
    names: impl IntoIterator<Item = &'a str>,
    errors_only: bool,
) -> Result<Vec<Box<dyn Reporter>>, UnknownReporterError> {
    names
        .into_iter()
        .map(|name| match name {
            "console" => Ok(Box::new(ConsoleReporter::new(errors_only)) as Box<dyn Reporter>),
            "subprocess" => Ok(Box::new(SubprocessReporter::new()) as Box<dyn Reporter>),
            other => Err(UnknownReporterError::new(other)),
        })
        .collect()
}
