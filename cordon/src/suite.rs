// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The suite tree: named suites containing test cases.
//!
//! A [`Suite`] is an immutable hierarchy of child suites and
//! [`Testcase`]s, built once by the authoring layer and borrowed
//! read-only by the runner for the duration of a run. Test cases are
//! identified by their qualified path: the `/`-joined names of their
//! ancestor suites followed by their own name.

use crate::errors::SuiteBuildError;
use debug_ignore::DebugIgnore;
use std::fmt;

/// The character separating suite names in a qualified path.
pub const PATH_SEPARATOR: char = '/';

/// A domain failure reported by a test body.
///
/// Test bodies report failure by returning `Err(TestFailure)`; panics
/// are caught separately at the execution boundary and treated as
/// generic failures.
#[derive(Clone, Debug)]
pub struct TestFailure {
    message: String,
}

impl TestFailure {
    /// Creates a new failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TestFailure {}

impl From<String> for TestFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TestFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// The executable body of a test case.
pub type TestBody = Box<dyn Fn() -> Result<(), TestFailure> + Send + Sync>;

/// A single named test case.
#[derive(Debug)]
pub struct Testcase {
    name: String,
    body: DebugIgnore<TestBody>,
}

impl Testcase {
    /// Creates a test case with the given name and body.
    ///
    /// The name must be non-empty and must not contain `/`.
    pub fn new<F>(name: impl Into<String>, body: F) -> Result<Self, SuiteBuildError>
    where
        F: Fn() -> Result<(), TestFailure> + Send + Sync + 'static,
    {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            body: DebugIgnore(Box::new(body)),
        })
    }

    /// Returns the name of this test case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the test body directly, without any isolation.
    pub fn invoke(&self) -> Result<(), TestFailure> {
        (self.body)()
    }
}

/// A named suite of test cases and child suites.
///
/// Child suites are processed depth-first and sequentially; a suite's
/// own test cases are dispatched concurrently once every child suite
/// has finished.
#[derive(Debug)]
pub struct Suite {
    name: String,
    suites: Vec<Suite>,
    tests: Vec<Testcase>,
}

impl Suite {
    /// Starts building a suite with the given name.
    pub fn builder(name: impl Into<String>) -> SuiteBuilder {
        SuiteBuilder {
            name: name.into(),
            suites: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// Returns the name of this suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the child suites, in declaration order.
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Returns this suite's own test cases, in declaration order.
    pub fn tests(&self) -> &[Testcase] {
        &self.tests
    }
}

/// A builder for [`Suite`] instances.
#[derive(Debug)]
pub struct SuiteBuilder {
    name: String,
    suites: Vec<Suite>,
    tests: Vec<Testcase>,
}

impl SuiteBuilder {
    /// Adds a child suite.
    pub fn suite(mut self, suite: Suite) -> Self {
        self.suites.push(suite);
        self
    }

    /// Adds a test case to this suite's own level.
    pub fn test(mut self, test: Testcase) -> Self {
        self.tests.push(test);
        self
    }

    /// Validates the suite name and produces the immutable [`Suite`].
    pub fn build(self) -> Result<Suite, SuiteBuildError> {
        validate_name(&self.name)?;
        Ok(Suite {
            name: self.name,
            suites: self.suites,
            tests: self.tests,
        })
    }
}

fn validate_name(name: &str) -> Result<(), SuiteBuildError> {
    if name.is_empty() {
        return Err(SuiteBuildError::EmptyName);
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(SuiteBuildError::NameContainsSeparator {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Joins a suite path and a leaf name into a qualified path.
pub(crate) fn join_path(prefix: &str, leaf: &str) -> String {
    if prefix.is_empty() {
        leaf.to_owned()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{leaf}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_declared_order() {
        let suite = Suite::builder("outer")
            .suite(Suite::builder("inner").build().unwrap())
            .test(Testcase::new("first", || Ok(())).unwrap())
            .test(Testcase::new("second", || Ok(())).unwrap())
            .build()
            .unwrap();

        assert_eq!(suite.name(), "outer");
        assert_eq!(suite.suites().len(), 1);
        assert_eq!(suite.suites()[0].name(), "inner");
        let names: Vec<_> = suite.tests().iter().map(Testcase::name).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(matches!(
            Suite::builder("").build(),
            Err(SuiteBuildError::EmptyName)
        ));
        assert!(matches!(
            Testcase::new("", || Ok(())),
            Err(SuiteBuildError::EmptyName)
        ));
    }

    #[test]
    fn separator_in_names_is_rejected() {
        assert!(matches!(
            Suite::builder("a/b").build(),
            Err(SuiteBuildError::NameContainsSeparator { .. })
        ));
        assert!(matches!(
            Testcase::new("a/b", || Ok(())),
            Err(SuiteBuildError::NameContainsSeparator { .. })
        ));
    }

    #[test]
    fn invoke_surfaces_domain_failure() {
        let test = Testcase::new("fails", || Err(TestFailure::new("nope"))).unwrap();
        let err = test.invoke().unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn join_path_skips_empty_prefix() {
        assert_eq!(join_path("", "top"), "top");
        assert_eq!(join_path("a/b", "c"), "a/b/c");
    }
}
