// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture test binary exercised by the integration tests.
//!
//! Declares a small suite tree with passing, failing, panicking,
//! aborting and hanging tests, then hands control to the harness.

use cordon::suite::{Suite, TestFailure, Testcase};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    cordon::run(&[fixture_tree()])
}

fn fixture_tree() -> Suite {
    let basics = Suite::builder("basics")
        .test(Testcase::new("pass-one", || Ok(())).unwrap())
        .test(Testcase::new("pass-two", || Ok(())).unwrap())
        .test(
            Testcase::new("soft-failure", || Err(TestFailure::new("expected 4, got 5"))).unwrap(),
        )
        .test(Testcase::new("panics", || panic!("boom")).unwrap())
        .build()
        .unwrap();

    let inner = Suite::builder("inner")
        .test(Testcase::new("deep-pass", || Ok(())).unwrap())
        .build()
        .unwrap();
    let tree = Suite::builder("tree")
        .suite(inner)
        .test(Testcase::new("outer-pass", || Ok(())).unwrap())
        .build()
        .unwrap();

    let hazards = Suite::builder("hazards")
        .test(Testcase::new("aborts", || std::process::abort()).unwrap())
        .test(
            Testcase::new("hangs", || {
                loop {
                    std::thread::sleep(Duration::from_secs(60));
                }
            })
            .unwrap(),
        )
        .build()
        .unwrap();

    Suite::builder("fixture")
        .suite(basics)
        .suite(tree)
        .suite(hazards)
        .build()
        .unwrap()
}
