// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Cordon is a test harness that runs a statically declared tree of test
//! suites, isolating each test case in its own child process so that a
//! crash or hang cannot take down sibling tests.
//!
//! A test binary declares its suites with [`Suite::builder`](suite::Suite)
//! and hands them to [`run`] from `main`:
//!
//! ```no_run
//! use cordon::suite::{Suite, Testcase};
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     let suite = Suite::builder("arithmetic")
//!         .test(Testcase::new("two-plus-two", || {
//!             assert_eq!(2 + 2, 4);
//!             Ok(())
//!         }).unwrap())
//!         .build()
//!         .unwrap();
//!     cordon::run(&[suite])
//! }
//! ```
//!
//! The harness re-invokes its own binary with `--test <path> --reporter
//! subprocess` to run a single test case in a child process, reads the
//! result back over a pipe, and force-terminates children that outlive
//! the configured timeout. See the [`runner`] and [`protocol`] modules
//! for the details.

pub mod dispatch;
pub mod errors;
pub mod filter;
pub mod protocol;
pub mod reporter;
pub mod runner;
pub mod suite;
mod time;

pub use dispatch::{run, run_with_args};
