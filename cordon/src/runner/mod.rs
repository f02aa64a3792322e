// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test runner.
//!
//! The main structure in this module is [`TestRunner`], created via a
//! [`TestRunnerBuilder`]. It walks the suite tree depth-first and
//! dispatches each suite's own tests through a bounded concurrency
//! window, running every test in an isolated child process unless the
//! run filter names exactly one test.

mod executor;
mod imp;
mod watchdog;

pub use imp::*;
