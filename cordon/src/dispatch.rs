// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command-line driver for a cordon test binary.
//!
//! A test binary's `main` builds its suite tree and calls [`run`], which
//! parses the process arguments, wires up reporters, constructs the
//! runner and turns the summary into an exit code. The same entry point
//! serves both roles of the isolation protocol: a parent run, and a
//! child re-invoked with `--test <path> --reporter subprocess`.

use crate::{
    filter::TestFilter,
    protocol::TestStatus,
    reporter::{CombinedReporter, Reporter, reporters_by_name},
    runner::TestRunnerBuilder,
    suite::Suite,
};
use clap::Parser;
use owo_colors::OwoColorize;
use std::{
    ffi::OsString,
    io::Write,
    num::NonZeroUsize,
    process::ExitCode,
    time::Duration,
};
use tracing::debug;

/// Command-line arguments accepted by a cordon test binary.
#[derive(Debug, Parser)]
#[command(version, about = "Runs this binary's test suites, isolating each test case")]
pub struct HarnessApp {
    /// Number of tests within one suite to run simultaneously
    #[arg(long, short = 'j', value_name = "N", default_value_t = NonZeroUsize::MIN)]
    test_threads: NonZeroUsize,

    /// Per-test timeout in seconds; 0 disables the watchdog
    #[arg(long, short = 'l', value_name = "SECONDS", default_value_t = 60)]
    timeout: u64,

    /// Run only the test or suite selected by this `suite(s)/testcase` path
    #[arg(long, short = 't', value_name = "PATH")]
    test: Option<String>,

    /// Reporter to deliver events to (console, subprocess); repeatable
    #[arg(long = "reporter", short = 'r', value_name = "NAME")]
    reporters: Vec<String>,

    /// Disable all reporters
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Only print failures and the summary on the console
    #[arg(long, short = 'e')]
    errors_only: bool,
}

impl HarnessApp {
    /// Executes the run described by these arguments over `suites`.
    pub fn exec(&self, suites: &[Suite]) -> ExitCode {
        init_tracing();

        let filter = match &self.test {
            None => TestFilter::All,
            Some(input) => match TestFilter::parse(input) {
                Ok(filter) => filter,
                Err(error) => {
                    if self.quiet {
                        // With reporters disabled there is nobody to show
                        // the error to; assume we are someone's child and
                        // answer in protocol terms instead.
                        emit_not_found();
                    } else {
                        eprintln!("{}: {error}", "error".red().bold());
                    }
                    return ExitCode::FAILURE;
                }
            },
        };

        let selected: Vec<&str> = if !self.reporters.is_empty() {
            self.reporters.iter().map(String::as_str).collect()
        } else if self.quiet {
            Vec::new()
        } else {
            vec!["console"]
        };
        let reporters = match reporters_by_name(selected, self.errors_only) {
            Ok(reporters) => reporters,
            Err(error) => {
                eprintln!("{}: {error}", "error".red().bold());
                return ExitCode::FAILURE;
            }
        };
        let reporter = CombinedReporter::new(reporters);

        let mut builder = TestRunnerBuilder::default();
        builder
            .set_test_threads(self.test_threads)
            .set_timeout(Duration::from_secs(self.timeout))
            .set_filter(filter);
        let runner = match builder.build() {
            Ok(runner) => runner,
            Err(error) => {
                eprintln!("{}: {error}", "error".red().bold());
                return ExitCode::FAILURE;
            }
        };

        debug!(test_threads = self.test_threads.get(), timeout = self.timeout, "starting run");
        let summary = runner.execute(suites, &reporter);
        reporter.summary(&summary);

        if summary.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Parses the real process arguments and executes `suites`.
///
/// Returns the exit code for `main`: success exactly when every
/// dispatched test passed.
pub fn run(suites: &[Suite]) -> ExitCode {
    run_with_args(suites, std::env::args_os())
}

/// Like [`run`], but with explicit arguments. Useful for tests.
pub fn run_with_args<I, T>(suites: &[Suite], args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    HarnessApp::parse_from(args).exec(suites)
}

/// Writes the bare NotFound code to stdout, matching the isolation
/// protocol's encoding so a parent instance reads it as a result rather
/// than as program failure.
fn emit_not_found() {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{}", TestStatus::NotFound.code());
    let _ = stdout.flush();
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    // Diagnostics go to stderr: stdout may be carrying the isolation
    // protocol.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
