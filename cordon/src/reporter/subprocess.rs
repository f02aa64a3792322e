// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Reporter;
use crate::protocol;
use crate::runner::TestResult;
use std::io::Write;

/// The child half of the isolation protocol.
///
/// An isolated child is invoked with `--reporter subprocess` and an
/// exact-match filter, so exactly one test runs and exactly one protocol
/// line is written to standard output. Every other event is silent.
#[derive(Default)]
pub struct SubprocessReporter {}

impl SubprocessReporter {
    /// Creates a subprocess reporter.
    pub fn new() -> Self {
        Self {}
    }
}

impl Reporter for SubprocessReporter {
    fn test_finished(&self, result: &TestResult) {
        let mut stdout = std::io::stdout().lock();
        // The parent only ever reads one line; write failures here mean
        // the parent is gone and there is nobody left to report to.
        let _ = writeln!(
            stdout,
            "{}",
            protocol::encode_line(result.status, &result.description)
        );
        let _ = stdout.flush();
    }
}
