// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selecting which suites and test cases are in scope for a run.
//!
//! The main structure in this module is [`TestFilter`]. A filter is
//! either empty (run everything) or a `/`-joined path naming a suite
//! prefix or one exact test case. Exact matches additionally switch the
//! runner into in-process execution, which is how an isolated child
//! avoids re-isolating itself.

use crate::errors::FilterParseError;
use crate::suite::PATH_SEPARATOR;

/// A filter over qualified test paths.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum TestFilter {
    /// Every suite and test is in scope; nothing is an exact match.
    #[default]
    All,

    /// A qualified test path or suite-path prefix.
    ///
    /// A suite-path prefix selects every test underneath that suite; a
    /// full qualified path selects exactly one test.
    Name(String),
}

impl TestFilter {
    /// Parses a filter string.
    ///
    /// An empty string is [`TestFilter::All`]. A non-empty string must
    /// contain at least one `/` (the `suite(s)/testcase` format); anything
    /// else is a [`FilterParseError`].
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        if input.is_empty() {
            Ok(TestFilter::All)
        } else if !input.contains(PATH_SEPARATOR) {
            Err(FilterParseError::new(input))
        } else {
            Ok(TestFilter::Name(input.to_owned()))
        }
    }

    /// Returns true if the suite at `suite_path` should be descended into.
    ///
    /// A suite is in scope if its path leads toward the filter (the suite
    /// path is a component-wise prefix of the filter) or lies underneath
    /// it. Out-of-scope suites are pruned without receiving any reporter
    /// notification.
    pub fn suite_in_scope(&self, suite_path: &str) -> bool {
        match self {
            TestFilter::All => true,
            TestFilter::Name(name) => {
                suite_path == name
                    || is_component_prefix(suite_path, name)
                    || is_component_prefix(name, suite_path)
            }
        }
    }

    /// Returns true if the test at `qualified_path` should be dispatched.
    pub fn test_in_scope(&self, qualified_path: &str) -> bool {
        match self {
            TestFilter::All => true,
            TestFilter::Name(name) => {
                qualified_path == name || is_component_prefix(name, qualified_path)
            }
        }
    }

    /// Returns true if the filter names exactly this test case.
    pub fn is_exact_match(&self, qualified_path: &str) -> bool {
        matches!(self, TestFilter::Name(name) if name == qualified_path)
    }
}

/// Returns true if `prefix` is a proper component-wise prefix of `path`.
///
/// Matching at component boundaries means the filter `a/b` does not
/// match the unrelated suite `a/bb`.
fn is_component_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path[prefix.len()..].starts_with(PATH_SEPARATOR)
}
