// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::executor;
use crate::{
    errors::RunnerBuildError,
    filter::TestFilter,
    protocol::TestStatus,
    reporter::Reporter,
    suite::{Suite, Testcase, join_path},
};
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use futures::StreamExt;
use std::{
    future::Future,
    num::NonZeroUsize,
    pin::Pin,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::runtime::Runtime;
use tracing::debug;

/// The result of one dispatched test case.
///
/// Exactly one of these is produced per dispatched test, regardless of
/// execution path or failure mode.
#[derive(Clone, Debug)]
pub struct TestResult {
    /// The `/`-joined path identifying the test case.
    pub qualified_path: String,

    /// The final status of the attempt.
    pub status: TestStatus,

    /// Free-text description; empty unless the test failed or crashed
    /// with a message.
    pub description: String,

    /// When the attempt started.
    pub start_time: DateTime<Local>,

    /// Wall-clock elapsed time of the attempt.
    pub duration: Duration,
}

/// Summary of a completed run, consumed by the reporters' summary call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunSummary {
    /// The number of test cases dispatched under the filter.
    pub initial_run_count: usize,

    /// The number of tests that passed.
    pub passed: usize,

    /// Every non-passing result, in completion order.
    pub failures: Vec<(TestStatus, String)>,
}

impl RunSummary {
    /// Returns true if every dispatched test passed.
    pub fn is_success(&self) -> bool {
        self.passed == self.initial_run_count
    }
}

/// How a test case is executed.
///
/// In-process execution is reachable only when the run filter names
/// exactly this test -- the invocation form used for an isolated child,
/// which must not spawn another child of its own.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExecMode {
    /// Invoke the test body directly on the dispatching worker.
    InProcess,

    /// Re-invoke the current executable to run this one test in a child
    /// process, supervised by the watchdog.
    Isolated,
}

impl ExecMode {
    /// Chooses the execution mode for the test at `qualified_path`.
    pub fn for_test(filter: &TestFilter, qualified_path: &str) -> Self {
        if filter.is_exact_match(qualified_path) {
            ExecMode::InProcess
        } else {
            ExecMode::Isolated
        }
    }
}

/// Thread-safe accumulation of per-test outcomes.
#[derive(Debug, Default)]
pub(super) struct RunAggregator {
    dispatched: AtomicUsize,
    passed: AtomicUsize,
    failures: Mutex<Vec<(TestStatus, String)>>,
}

impl RunAggregator {
    pub(super) fn on_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record(&self, result: &TestResult) {
        if result.status.is_pass() {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures
                .lock()
                .expect("failure list lock poisoned")
                .push((result.status, result.qualified_path.clone()));
        }
    }

    fn into_summary(self) -> RunSummary {
        RunSummary {
            initial_run_count: self.dispatched.into_inner(),
            passed: self.passed.into_inner(),
            failures: self
                .failures
                .into_inner()
                .expect("failure list lock poisoned"),
        }
    }
}

/// Test runner options.
#[derive(Debug, Default)]
pub struct TestRunnerBuilder {
    test_threads: Option<NonZeroUsize>,
    timeout: Option<Duration>,
    filter: Option<TestFilter>,
    current_exe: Option<Utf8PathBuf>,
}

impl TestRunnerBuilder {
    /// Sets the number of tests within one suite to run simultaneously.
    /// Defaults to 1.
    pub fn set_test_threads(&mut self, test_threads: NonZeroUsize) -> &mut Self {
        self.test_threads = Some(test_threads);
        self
    }

    /// Sets the per-test timeout enforced by the watchdog. Defaults to
    /// 60 seconds. A zero duration disables the watchdog entirely, so a
    /// hung child will block its worker indefinitely.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the run filter. Defaults to [`TestFilter::All`].
    pub fn set_filter(&mut self, filter: TestFilter) -> &mut Self {
        self.filter = Some(filter);
        self
    }

    /// Overrides the executable re-invoked for isolated execution.
    /// Defaults to the currently running executable.
    pub fn set_current_exe(&mut self, current_exe: Utf8PathBuf) -> &mut Self {
        self.current_exe = Some(current_exe);
        self
    }

    /// Creates a new test runner.
    pub fn build(self) -> Result<TestRunner, RunnerBuildError> {
        let current_exe = match self.current_exe {
            Some(exe) => exe,
            None => {
                let exe = std::env::current_exe().map_err(RunnerBuildError::CurrentExe)?;
                Utf8PathBuf::try_from(exe)?
            }
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("cordon-runner-worker")
            .build()
            .map_err(RunnerBuildError::RuntimeCreate)?;
        Ok(TestRunner {
            test_threads: self.test_threads.map_or(1, NonZeroUsize::get),
            timeout: self.timeout.unwrap_or(Duration::from_secs(60)),
            filter: self.filter.unwrap_or_default(),
            current_exe,
            runtime,
        })
    }
}

/// Context for running tests.
///
/// Created using [`TestRunnerBuilder::build`]. The runner owns its own
/// Tokio runtime so [`TestRunner::execute`] stays synchronous for the
/// caller.
#[derive(Debug)]
pub struct TestRunner {
    pub(super) test_threads: usize,
    pub(super) timeout: Duration,
    pub(super) filter: TestFilter,
    pub(super) current_exe: Utf8PathBuf,
    runtime: Runtime,
}

/// Per-run shared state handed to every dispatched test.
pub(super) struct RunContext<'a> {
    pub(super) reporter: &'a dyn Reporter,
    /// Gate serializing a test's started/finished pair against other
    /// concurrently finishing tests. Never held across the blocking
    /// execution itself.
    pub(super) report_gate: Mutex<()>,
    pub(super) aggregator: RunAggregator,
}

impl TestRunner {
    /// Runs every in-scope test in `suites` and returns the summary.
    ///
    /// Suites are traversed depth-first and sequentially; each suite's
    /// own tests are dispatched concurrently, bounded by the configured
    /// worker count.
    pub fn execute(&self, suites: &[Suite], reporter: &dyn Reporter) -> RunSummary {
        let cx = RunContext {
            reporter,
            report_gate: Mutex::new(()),
            aggregator: RunAggregator::default(),
        };
        self.runtime.block_on(async {
            for suite in suites {
                self.handle_suite(suite, "", &cx).await;
            }
        });
        let summary = cx.aggregator.into_summary();
        debug!(
            dispatched = summary.initial_run_count,
            passed = summary.passed,
            "run complete"
        );
        summary
    }

    /// Processes one suite: notify start, recurse into child suites one
    /// at a time, then dispatch this suite's own tests through the
    /// bounded concurrency window, and notify finish only after they
    /// have all completed.
    fn handle_suite<'a>(
        &'a self,
        suite: &'a Suite,
        parent_path: &'a str,
        cx: &'a RunContext<'a>,
    ) -> Pin<Box<dyn Future<Output = ()> + 'a>> {
        Box::pin(async move {
            let suite_path = join_path(parent_path, suite.name());
            if !self.filter.suite_in_scope(&suite_path) {
                debug!(suite = %suite_path, "pruned by filter");
                return;
            }
            cx.reporter.suite_started(&suite_path);

            for child in suite.suites() {
                self.handle_suite(child, &suite_path, cx).await;
            }

            let in_scope = suite.tests().iter().filter(|test| {
                self.filter
                    .test_in_scope(&join_path(&suite_path, test.name()))
            });
            let mut running = futures::stream::iter(
                in_scope.map(|test| self.run_test(test, &suite_path, cx)),
            )
            .buffer_unordered(self.test_threads);
            while running.next().await.is_some() {}

            cx.reporter.suite_finished(&suite_path);
        })
    }

    /// Dispatches a single test case and reports its result.
    async fn run_test(&self, test: &Testcase, suite_path: &str, cx: &RunContext<'_>) {
        let qualified_path = join_path(suite_path, test.name());
        cx.aggregator.on_dispatch();
        let mode = ExecMode::for_test(&self.filter, &qualified_path);
        debug!(test = %qualified_path, ?mode, "dispatching");

        // With a single worker the start notification can be emitted
        // synchronously, before execution.
        if self.test_threads == 1 {
            cx.reporter.test_started(&qualified_path);
        }

        let stopwatch = crate::time::stopwatch();
        let (status, description) = match mode {
            ExecMode::InProcess => executor::run_in_process(test),
            ExecMode::Isolated => self.run_isolated(&qualified_path).await,
        };
        let snapshot = stopwatch.snapshot();

        let result = TestResult {
            qualified_path,
            status,
            description,
            start_time: snapshot.start_time,
            duration: snapshot.duration,
        };
        cx.aggregator.record(&result);

        if self.test_threads == 1 {
            cx.reporter.test_finished(&result);
        } else {
            let _guard = cx.report_gate.lock().expect("reporter gate poisoned");
            cx.reporter.test_started(&result.qualified_path);
            cx.reporter.test_finished(&result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::TestFailure;
    use pretty_assertions::assert_eq;

    /// Records every event it sees, in order.
    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Reporter for RecordingReporter {
        fn suite_started(&self, suite_path: &str) {
            self.push(format!("suite-started {suite_path}"));
        }

        fn suite_finished(&self, suite_path: &str) {
            self.push(format!("suite-finished {suite_path}"));
        }

        fn test_started(&self, qualified_path: &str) {
            self.push(format!("test-started {qualified_path}"));
        }

        fn test_finished(&self, result: &TestResult) {
            self.push(format!(
                "test-finished {} {}",
                result.qualified_path, result.status
            ));
        }
    }

    fn exact_runner(filter: &str) -> TestRunner {
        let mut builder = TestRunnerBuilder::default();
        builder.set_filter(TestFilter::parse(filter).unwrap());
        builder.build().unwrap()
    }

    #[test]
    fn exec_mode_is_in_process_only_for_exact_match() {
        let filter = TestFilter::parse("a/b/t").unwrap();
        assert_eq!(ExecMode::for_test(&filter, "a/b/t"), ExecMode::InProcess);
        assert_eq!(ExecMode::for_test(&filter, "a/b/u"), ExecMode::Isolated);
        assert_eq!(
            ExecMode::for_test(&TestFilter::All, "a/b/t"),
            ExecMode::Isolated
        );
    }

    #[test]
    fn aggregator_counts_and_collects_failures() {
        let aggregator = RunAggregator::default();
        for (status, path) in [
            (TestStatus::Passed, "s/pass"),
            (TestStatus::Failed, "s/fail"),
            (TestStatus::TimedOut, "s/hang"),
        ] {
            aggregator.on_dispatch();
            aggregator.record(&TestResult {
                qualified_path: path.to_owned(),
                status,
                description: String::new(),
                start_time: Local::now(),
                duration: Duration::ZERO,
            });
        }
        let summary = aggregator.into_summary();
        assert_eq!(summary.initial_run_count, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(
            summary.failures,
            vec![
                (TestStatus::Failed, "s/fail".to_owned()),
                (TestStatus::TimedOut, "s/hang".to_owned()),
            ]
        );
        assert!(!summary.is_success());
    }

    #[test]
    fn exact_match_runs_in_process_and_passes() {
        let suite = Suite::builder("unit")
            .test(Testcase::new("passes", || Ok(())).unwrap())
            .build()
            .unwrap();
        let reporter = RecordingReporter::default();
        let summary = exact_runner("unit/passes").execute(&[suite], &reporter);

        assert_eq!(summary.initial_run_count, 1);
        assert_eq!(summary.passed, 1);
        assert!(summary.is_success());
        assert_eq!(
            reporter.events(),
            vec![
                "suite-started unit",
                "test-started unit/passes",
                "test-finished unit/passes passed",
                "suite-finished unit",
            ]
        );
    }

    #[test]
    fn exact_match_on_domain_failure_is_failed() {
        let suite = Suite::builder("unit")
            .test(
                Testcase::new("fails", || Err(TestFailure::new("expected 4, got 5"))).unwrap(),
            )
            .build()
            .unwrap();
        let reporter = RecordingReporter::default();
        let summary = exact_runner("unit/fails").execute(&[suite], &reporter);

        assert_eq!(summary.passed, 0);
        assert_eq!(
            summary.failures,
            vec![(TestStatus::Failed, "unit/fails".to_owned())]
        );
    }

    #[test]
    fn exact_match_on_panic_is_failed_not_fatal() {
        let suite = Suite::builder("unit")
            .test(Testcase::new("panics", || panic!("boom")).unwrap())
            .build()
            .unwrap();
        let reporter = RecordingReporter::default();
        let summary = exact_runner("unit/panics").execute(&[suite], &reporter);

        assert_eq!(
            summary.failures,
            vec![(TestStatus::Failed, "unit/panics".to_owned())]
        );
    }

    #[test]
    fn sibling_tests_are_pruned_by_exact_filter() {
        let suite = Suite::builder("unit")
            .test(Testcase::new("wanted", || Ok(())).unwrap())
            .test(Testcase::new("unwanted", || Err(TestFailure::new("no"))).unwrap())
            .build()
            .unwrap();
        let reporter = RecordingReporter::default();
        let summary = exact_runner("unit/wanted").execute(&[suite], &reporter);

        assert_eq!(summary.initial_run_count, 1);
        assert!(summary.is_success());
    }

    #[test]
    fn pruned_suites_receive_no_notifications() {
        let wanted = Suite::builder("wanted")
            .test(Testcase::new("t", || Ok(())).unwrap())
            .build()
            .unwrap();
        let pruned = Suite::builder("pruned")
            .test(Testcase::new("t", || Ok(())).unwrap())
            .build()
            .unwrap();
        let root = Suite::builder("root").suite(wanted).suite(pruned).build().unwrap();

        let reporter = RecordingReporter::default();
        exact_runner("root/wanted/t").execute(&[root], &reporter);
        let events = reporter.events();
        assert!(events.iter().all(|event| !event.contains("pruned")));
        assert!(events.contains(&"suite-started root/wanted".to_owned()));
    }

    #[test]
    fn child_suites_finish_before_own_tests_dispatch() {
        let inner = Suite::builder("inner")
            .test(Testcase::new("deep", || Ok(())).unwrap())
            .build()
            .unwrap();
        // Both tests are selected with a filter naming the parent suite;
        // they run isolated, but the event ordering between the child
        // suite and the parent's own test is what matters here. Use an
        // exact filter on the inner test so only it executes, while the
        // outer suite is still entered.
        let outer = Suite::builder("outer")
            .suite(inner)
            .test(Testcase::new("shallow", || Ok(())).unwrap())
            .build()
            .unwrap();

        let reporter = RecordingReporter::default();
        exact_runner("outer/inner/deep").execute(&[outer], &reporter);
        let events = reporter.events();
        let inner_finished = events
            .iter()
            .position(|e| e == "suite-finished outer/inner")
            .unwrap();
        let outer_finished = events
            .iter()
            .position(|e| e == "suite-finished outer")
            .unwrap();
        assert!(inner_finished < outer_finished);
    }
}
