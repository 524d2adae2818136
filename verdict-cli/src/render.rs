//! Terminal rendering of a result sequence

use verdict_core::{TestResult, TestResults, TestStatus};

/// Render the log and summary as plain text
///
/// With `summary_only` the verbatim log is left out.
pub fn text(results: &TestResults, summary_only: bool) -> String {
    let mut out = String::new();

    if !summary_only {
        for line in results.log() {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str("Summary\n");
    out.push_str("=======\n");

    let summary = results.summary();
    if summary.is_empty() {
        out.push_str("No test results found\n");
    }
    for result in &summary {
        out.push_str(&format!(
            "{}  {}\n",
            marker(result.status()),
            result.message()
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "{} passed, {} failed",
        results.passed_count(),
        results.failed_count()
    ));

    out
}

/// Render the sequence (or only its summary) as a JSON array
pub fn json(results: &TestResults, summary_only: bool) -> serde_json::Result<String> {
    if summary_only {
        let summary: Vec<&TestResult> = results.summary();
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string_pretty(results)
    }
}

fn marker(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "PASS",
        TestStatus::Failed => "FAIL",
        TestStatus::Info => "INFO",
    }
}
