// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by cordon.
//!
//! Per-test failures are not represented here: a failing, crashing or
//! timed-out test is ordinary data (a [`TestStatus`] plus description)
//! and never aborts the run. The only abort-level error is a malformed
//! filter, surfaced before any test executes.
//!
//! [`TestStatus`]: crate::protocol::TestStatus

use thiserror::Error;

/// An error that occurred while parsing a test filter.
///
/// A non-empty filter must have the `suite(s)/testcase` format, with at
/// least one `/` separating the suite path from the test name.
#[derive(Clone, Debug, Error)]
#[error("invalid test filter `{input}`: expected the `suite(s)/testcase` format")]
pub struct FilterParseError {
    input: String,
}

impl FilterParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the rejected filter string.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An error that occurred while constructing a suite tree.
#[derive(Clone, Debug, Error)]
pub enum SuiteBuildError {
    /// A suite or test case name was empty.
    #[error("suite and test names must be non-empty")]
    EmptyName,

    /// A suite or test case name contained the path separator.
    #[error("name `{name}` contains the path separator `/`")]
    NameContainsSeparator {
        /// The offending name.
        name: String,
    },
}

/// An error that occurred while building a test runner.
#[derive(Debug, Error)]
pub enum RunnerBuildError {
    /// Creating the Tokio runtime failed.
    #[error("failed to create Tokio runtime")]
    RuntimeCreate(#[source] std::io::Error),

    /// The path of the currently running executable could not be
    /// determined. It is required to re-invoke the binary for isolated
    /// execution.
    #[error("failed to determine the current executable path")]
    CurrentExe(#[source] std::io::Error),

    /// The current executable path is not valid UTF-8.
    #[error("current executable path is not valid UTF-8")]
    CurrentExeInvalidUtf8(#[from] camino::FromPathBufError),
}

/// An error that occurred while resolving reporter selections.
#[derive(Clone, Debug, Error)]
#[error("unknown reporter `{name}` (known reporters: console, subprocess)")]
pub struct UnknownReporterError {
    name: String,
}

impl UnknownReporterError {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the unrecognized reporter name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
