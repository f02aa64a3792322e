// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The wire protocol between a parent runner and an isolated child.
//!
//! A child re-running a single test case writes exactly one line to its
//! standard output: `"<code><space><message>"`, where `code` is a small
//! non-negative integer and `message` is free text up to the end of the
//! line. This line is the sole channel of truth for the child's outcome;
//! the child's exit code is never consulted for status.
//!
//! Decoding is deliberately defensive: a corrupted or empty stream (for
//! example from a native crash before any output) must never be mistaken
//! for a specific failure code, so anything unparsable maps to
//! [`TestStatus::Crashed`] at the call site.

use std::fmt;

/// The final status of one dispatched test case.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum TestStatus {
    /// The test body completed without failure.
    Passed,

    /// The test body reported a domain failure or panicked.
    Failed,

    /// The isolated child terminated without producing a decodable
    /// protocol line.
    Crashed,

    /// The watchdog force-terminated the child after the timeout.
    TimedOut,

    /// The requested test does not exist in the suite tree.
    NotFound,
}

impl TestStatus {
    /// Returns the wire code for this status.
    pub fn code(self) -> u8 {
        match self {
            TestStatus::Passed => 0,
            TestStatus::Failed => 1,
            TestStatus::Crashed => 2,
            TestStatus::TimedOut => 3,
            TestStatus::NotFound => 4,
        }
    }

    /// Maps a wire code back to a status. Codes outside the recognized
    /// range return `None` and are treated as a crash by the reader.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(TestStatus::Passed),
            1 => Some(TestStatus::Failed),
            2 => Some(TestStatus::Crashed),
            3 => Some(TestStatus::TimedOut),
            4 => Some(TestStatus::NotFound),
            _ => None,
        }
    }

    /// Returns true for [`TestStatus::Passed`].
    pub fn is_pass(self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Crashed => "crashed",
            TestStatus::TimedOut => "timed out",
            TestStatus::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// A decoded protocol line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WireResult {
    /// The decoded status.
    pub status: TestStatus,

    /// The message carried on the line; empty unless the status has a
    /// description attached.
    pub message: String,
}

/// Encodes a status and message as one protocol line, without a trailing
/// newline.
///
/// Embedded newlines in the message would truncate the line at the
/// reader, so they are flattened to spaces.
pub fn encode_line(status: TestStatus, message: &str) -> String {
    if message.contains('\n') {
        format!("{} {}", status.code(), message.replace('\n', " "))
    } else {
        format!("{} {}", status.code(), message)
    }
}

/// Decodes one protocol line read from a child's standard output.
///
/// The line consists of a leading unsigned integer token, exactly one
/// separator byte, and the message up to the trailing newline or end of
/// stream. Returns `None` if no valid status can be decoded; the caller
/// records a crash (or a timeout, if the watchdog fired and the stream
/// was empty).
pub fn decode_line(line: &str) -> Option<WireResult> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    if digits_end == 0 {
        return None;
    }
    let code: u64 = line[..digits_end].parse().ok()?;
    let status = TestStatus::from_code(code)?;
    // Skip exactly one separator byte; a bare code with no message is
    // also accepted (the degenerate NotFound emission is code-only).
    let rest = &line[digits_end..];
    let message = rest.strip_prefix(' ').unwrap_or(rest);
    Some(WireResult {
        status,
        message: message.to_owned(),
    })
}
