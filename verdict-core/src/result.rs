//! Result model for a single test run
//!
//! A run produces one [`TestResults`] sequence. Its order is the order in
//! which the tool printed lines to stdout, with the folded stderr entry (if
//! any) always last. Front-ends render the whole sequence as a log and
//! [`TestResults::summary`] as the pass/fail view.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::{classify_line, ERROR_PREFIX};
use crate::Error;

/// Classification of one line of tool output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Progress or informational output
    Info,
    /// A line reporting a passing test
    Passed,
    /// A line reporting a failing test, or a folded error
    Failed,
}

impl TestStatus {
    /// Get the short name for this status
    pub fn name(&self) -> &'static str {
        match self {
            TestStatus::Info => "info",
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One classified line of output
///
/// The status is fixed when the value is created; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    message: String,
    status: TestStatus,
}

impl TestResult {
    /// Create a result with an explicit status
    pub fn new(message: impl Into<String>, status: TestStatus) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Create a result from a raw output line, classifying it
    pub fn from_line(line: impl Into<String>) -> Self {
        let message = line.into();
        let status = classify_line(&message);
        Self { message, status }
    }

    /// Create the synthetic `Failed` entry for error text
    pub fn error(text: &str) -> Self {
        Self {
            message: format!("{}{}", ERROR_PREFIX, text),
            status: TestStatus::Failed,
        }
    }

    /// The verbatim line (or synthesized error message)
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The classification outcome
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Whether this entry belongs in the summary view
    pub fn is_summary(&self) -> bool {
        self.status != TestStatus::Info
    }
}

/// Ordered results of one execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestResults {
    entries: Vec<TestResult>,
}

impl TestResults {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the one-entry sequence a caller shows when a run fails outright
    pub fn from_error(error: &Error) -> Self {
        Self {
            entries: vec![TestResult::error(&error.to_string())],
        }
    }

    /// Append an entry
    pub(crate) fn push(&mut self, result: TestResult) {
        self.entries.push(result);
    }

    /// All entries in output order
    pub fn entries(&self) -> &[TestResult] {
        &self.entries
    }

    /// Iterate over entries in output order
    pub fn iter(&self) -> std::slice::Iter<'_, TestResult> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the sequence has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The verbatim log view: every message, in order
    pub fn log(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(TestResult::message)
    }

    /// The summary view: every non-`Info` entry, in order
    pub fn summary(&self) -> Vec<&TestResult> {
        self.entries.iter().filter(|r| r.is_summary()).collect()
    }

    /// Number of `Passed` entries
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Number of `Failed` entries, including a folded stderr entry
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Check if any entry is `Failed`
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|r| r.status == TestStatus::Failed)
    }

    /// Take the entries out of the sequence
    pub fn into_vec(self) -> Vec<TestResult> {
        self.entries
    }

    fn count(&self, status: TestStatus) -> usize {
        self.entries.iter().filter(|r| r.status == status).count()
    }
}

impl IntoIterator for TestResults {
    type Item = TestResult;
    type IntoIter = std::vec::IntoIter<TestResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a TestResults {
    type Item = &'a TestResult;
    type IntoIter = std::slice::Iter<'a, TestResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<TestResult> for TestResults {
    fn from_iter<I: IntoIterator<Item = TestResult>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
