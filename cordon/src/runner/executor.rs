// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executing a single test case, in-process or in an isolated child.

use super::imp::TestRunner;
use super::watchdog::Watchdog;
use crate::protocol::{self, TestStatus};
use crate::suite::Testcase;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Invokes the test body directly on the calling worker.
///
/// Domain failures (an `Err` return) and generic failures (a panic) are
/// both contained here and converted to a `Failed` outcome; nothing
/// escapes to the caller.
pub(super) fn run_in_process(test: &Testcase) -> (TestStatus, String) {
    match catch_unwind(AssertUnwindSafe(|| test.invoke())) {
        Ok(Ok(())) => (TestStatus::Passed, String::new()),
        Ok(Err(failure)) => (TestStatus::Failed, failure.to_string()),
        Err(payload) => (TestStatus::Failed, panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_owned()
    }
}

impl TestRunner {
    /// Runs one test in a freshly spawned child process and decodes the
    /// result from the isolation protocol.
    ///
    /// The child is the same executable, re-invoked with an exact-match
    /// filter and the subprocess reporter. Its stdout line is the sole
    /// channel of truth for the outcome; the exit code is not consulted.
    pub(super) async fn run_isolated(&self, qualified_path: &str) -> (TestStatus, String) {
        let mut cmd = Command::new(self.current_exe.as_str());
        cmd.arg("--test")
            .arg(qualified_path)
            .arg("--reporter")
            .arg("subprocess")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(error) => {
                warn!(test = %qualified_path, %error, "failed to spawn isolated child");
                return (
                    TestStatus::Crashed,
                    format!("failed to spawn isolated child: {error}"),
                );
            }
        };
        debug!(test = %qualified_path, pid = child.id(), "spawned isolated child");

        let stdout = child.stdout.take().expect("child stdout was piped");
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut watchdog = Watchdog::new(self.timeout);

        let read_result = read_wire_line(&mut reader, &mut buf, &mut watchdog, || {
            // Force-terminate the child. Killing it closes the write end
            // of the pipe, so the retried read observes end-of-stream
            // instead of blocking forever.
            debug!(test = %qualified_path, "watchdog expired, killing child");
            if let Err(error) = child.start_kill() {
                warn!(test = %qualified_path, %error, "failed to kill timed-out child");
            }
        })
        .await;

        // Reap the child before finalizing the result.
        let _ = child.wait().await;

        if let Err(error) = read_result {
            debug!(test = %qualified_path, %error, "protocol read failed");
            buf.clear();
        }

        // If termination raced with natural completion, any bytes the
        // child managed to write take precedence; the fired flag only
        // decides the byteless case.
        if buf.is_empty() {
            return if watchdog.fired() {
                (TestStatus::TimedOut, String::new())
            } else {
                (TestStatus::Crashed, String::new())
            };
        }
        let line = String::from_utf8_lossy(&buf);
        match protocol::decode_line(&line) {
            Some(wire) => (wire.status, wire.message),
            None => {
                debug!(test = %qualified_path, line = %line.trim_end(), "undecodable protocol line");
                (TestStatus::Crashed, String::new())
            }
        }
    }
}

/// Reads the child's single protocol line into `buf`, racing the read
/// against the watchdog. When the deadline passes first, `on_deadline`
/// terminates the child and the read is retried to collect whatever was
/// written before the kill.
///
/// `read_until` appends to `buf` in place as data arrives, so bytes
/// already pulled off the pipe by an interrupted first read are retained
/// for the retry rather than dropped with the cancelled future.
async fn read_wire_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    watchdog: &mut Watchdog,
    on_deadline: impl FnOnce(),
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let first = tokio::select! {
        res = reader.read_until(b'\n', buf) => Some(res),
        () = watchdog.expired() => {
            on_deadline();
            None
        }
    };
    match first {
        Some(res) => res,
        None => reader.read_until(b'\n', buf).await,
    }
}
