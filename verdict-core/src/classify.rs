//! Line classification for captured tool output
//!
//! Classification is a plain substring check. `"Passed"` is tested before
//! `"Failed"`, so a line mentioning both counts as passed.

use crate::result::{TestResult, TestResults, TestStatus};

/// Line terminator used to split captured stdout
#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";

/// Line terminator used to split captured stdout
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

/// Prefix of synthesized error entries
pub const ERROR_PREFIX: &str = "[ERROR] ";

const PASSED_MARKER: &str = "Passed";
const FAILED_MARKER: &str = "Failed";

/// Classify a single line of output
pub fn classify_line(line: &str) -> TestStatus {
    if line.contains(PASSED_MARKER) {
        TestStatus::Passed
    } else if line.contains(FAILED_MARKER) {
        TestStatus::Failed
    } else {
        TestStatus::Info
    }
}

/// Fold captured stdout and stderr into an ordered result sequence
///
/// Every stdout line becomes one entry, in order. This is a plain split, so
/// empty stdout still yields a single empty `Info` entry and a trailing
/// terminator yields a trailing empty entry. Non-empty stderr is appended
/// as one `Failed` entry carrying the whole text.
pub fn classify_output(stdout: &str, stderr: &str) -> TestResults {
    let mut results: TestResults = stdout
        .split(LINE_TERMINATOR)
        .map(TestResult::from_line)
        .collect();

    if !stderr.is_empty() {
        results.push(TestResult::error(stderr));
    }

    results
}
