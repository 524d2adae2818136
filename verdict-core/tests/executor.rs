//! End-to-end tests for the process executor
//!
//! `/bin/sh` stands in for the test tool: the "test binary" handed to it is a
//! shell script that prints whatever the scenario needs.

#![cfg(unix)]

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use verdict_core::{
    CancelReason, CancellationToken, Error, ProcessExecutor, Result, RunController, TestExecutor,
    TestResult, TestResults, TestStatus,
};

const SHELL: &str = "/bin/sh";

/// Upper bound for any single run; hitting it means the executor hung
const HANG_LIMIT: Duration = Duration::from_secs(30);

struct Fixture {
    dir: TempDir,
    script: PathBuf,
}

fn script(body: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("Tests.dll");
    fs::write(&script, body).unwrap();
    Fixture { dir, script }
}

fn pairs(results: &TestResults) -> Vec<(String, TestStatus)> {
    results
        .iter()
        .map(|r| (r.message().to_string(), r.status()))
        .collect()
}

async fn run(executor: &ProcessExecutor, fixture: &Fixture) -> Result<TestResults> {
    tokio::time::timeout(HANG_LIMIT, executor.execute(&fixture.script))
        .await
        .expect("executor hung")
}

#[tokio::test]
async fn test_classifies_stdout_in_order() {
    let fixture = script("printf 'Test1: Passed\\nTest2: Failed\\nTotal: 2'\n");
    let results = run(&ProcessExecutor::new(SHELL), &fixture).await.unwrap();

    assert_eq!(
        pairs(&results),
        vec![
            ("Test1: Passed".to_string(), TestStatus::Passed),
            ("Test2: Failed".to_string(), TestStatus::Failed),
            ("Total: 2".to_string(), TestStatus::Info),
        ]
    );

    let summary: Vec<&str> = results.summary().iter().map(|r| r.message()).collect();
    assert_eq!(summary, vec!["Test1: Passed", "Test2: Failed"]);
}

#[tokio::test]
async fn test_stderr_only() {
    let fixture = script("printf 'Could not load file' >&2\n");
    let results = run(&ProcessExecutor::new(SHELL), &fixture).await.unwrap();

    assert_eq!(
        pairs(&results),
        vec![
            (String::new(), TestStatus::Info),
            ("[ERROR] Could not load file".to_string(), TestStatus::Failed),
        ]
    );
}

#[tokio::test]
async fn test_silent_run_yields_single_info_entry() {
    let fixture = script("exit 0\n");
    let results = run(&ProcessExecutor::new(SHELL), &fixture).await.unwrap();

    assert_eq!(results.into_vec(), vec![TestResult::new("", TestStatus::Info)]);
}

#[tokio::test]
async fn test_multiline_stderr_is_one_trailing_entry() {
    let fixture = script(
        "echo 'Starting'\n\
         echo 'warning one' >&2\n\
         echo 'A Passed'\n\
         echo 'warning two' >&2\n",
    );
    let results = run(&ProcessExecutor::new(SHELL), &fixture).await.unwrap();

    // echo leaves a trailing newline, hence the empty Info entry before stderr
    assert_eq!(
        pairs(&results),
        vec![
            ("Starting".to_string(), TestStatus::Info),
            ("A Passed".to_string(), TestStatus::Passed),
            (String::new(), TestStatus::Info),
            (
                "[ERROR] warning one\nwarning two\n".to_string(),
                TestStatus::Failed
            ),
        ]
    );
}

#[tokio::test]
async fn test_exit_code_is_not_a_failure_signal() {
    let fixture = script("printf 'All Passed'\nexit 3\n");
    let results = run(&ProcessExecutor::new(SHELL), &fixture).await.unwrap();

    assert_eq!(results.into_vec(), vec![TestResult::new("All Passed", TestStatus::Passed)]);
}

#[tokio::test]
async fn test_large_output_on_both_streams_does_not_deadlock() {
    // stderr is filled first, so draining stdout alone would block on a full pipe.
    let fixture = script(
        "i=0\n\
         while [ $i -lt 3000 ]; do\n\
           echo 'diagnostic output that keeps the stderr pipe busy' >&2\n\
           i=$((i + 1))\n\
         done\n\
         i=0\n\
         while [ $i -lt 3000 ]; do\n\
           echo \"case $i Passed with a reasonably long line of text\"\n\
           i=$((i + 1))\n\
         done\n",
    );
    let results = run(&ProcessExecutor::new(SHELL), &fixture).await.unwrap();

    // 3000 lines plus the empty entry after the final newline, plus stderr
    assert_eq!(results.len(), 3002);
    assert_eq!(results.passed_count(), 3000);

    let last = results.entries().last().unwrap();
    assert_eq!(last.status(), TestStatus::Failed);
    assert!(last.message().len() > 64 * 1024);
    assert!(last.message().starts_with("[ERROR] diagnostic output"));
}

#[tokio::test]
async fn test_missing_tool_is_launch_error() {
    let fixture = script("echo unreachable\n");
    let executor = ProcessExecutor::new("/nonexistent/dir/vstest.console");

    let err = run(&executor, &fixture).await.unwrap_err();
    assert!(matches!(err, Error::Launch { .. }));
}

#[tokio::test]
async fn test_non_executable_tool_is_launch_error() {
    let fixture = script("echo unreachable\n");
    let tool = fixture.dir.path().join("vstest.console");
    fs::write(&tool, "#!/bin/sh\necho 'Test1: Passed'\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o644)).unwrap();

    let executor = ProcessExecutor::new(tool.to_string_lossy());
    match run(&executor, &fixture).await.unwrap_err() {
        Error::Launch { tool: name, source } => {
            assert_eq!(name, tool.to_string_lossy());
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("Expected Launch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancellation_kills_the_tool() {
    let fixture = script("echo 'Starting'\nexec sleep 60\n");
    let executor = ProcessExecutor::new(SHELL);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = tokio::time::timeout(
        HANG_LIMIT,
        executor.execute_with_cancel(&fixture.script, cancel),
    )
    .await
    .expect("executor hung")
    .unwrap_err();

    assert!(matches!(err, Error::Cancelled(CancelReason::Requested)));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_timeout_kills_the_tool() {
    let fixture = script("exec sleep 60\n");
    let executor = ProcessExecutor::new(SHELL).with_timeout(Duration::from_millis(200));

    let err = run(&executor, &fixture).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Cancelled(CancelReason::TimedOut(limit)) if limit == Duration::from_millis(200)
    ));
}

#[tokio::test]
async fn test_zero_timeout_lets_the_run_finish() {
    let fixture = script("sleep 0.2\nprintf 'Test1: Passed'\n");
    let executor = ProcessExecutor::new(SHELL).with_timeout(Duration::ZERO);

    let results = run(&executor, &fixture).await.unwrap();
    assert_eq!(
        results.into_vec(),
        vec![TestResult::new("Test1: Passed", TestStatus::Passed)]
    );
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let passing = script("printf 'Only Passed'\n");
    let failing = script("printf 'Only Failed'\n");
    let executor = ProcessExecutor::new(SHELL);

    let (a, b) = tokio::join!(
        executor.execute(&passing.script),
        executor.execute(&failing.script)
    );

    assert_eq!(
        a.unwrap().into_vec(),
        vec![TestResult::new("Only Passed", TestStatus::Passed)]
    );
    assert_eq!(
        b.unwrap().into_vec(),
        vec![TestResult::new("Only Failed", TestStatus::Failed)]
    );
}

#[tokio::test]
async fn test_controller_reports_launch_failure_as_single_entry() {
    let fixture = script("echo unreachable\n");
    let controller = RunController::new(ProcessExecutor::new("/nonexistent/dir/vstest.console"));

    let results = controller.run_or_report(&fixture.script).await;
    assert_eq!(results.len(), 1);

    let entry = &results.entries()[0];
    assert_eq!(entry.status(), TestStatus::Failed);
    assert!(entry
        .message()
        .starts_with("[ERROR] Failed to launch '/nonexistent/dir/vstest.console'"));
}
