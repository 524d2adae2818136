//! Test tool execution
//!
//! A [`ProcessExecutor`] runs the configured tool with the test binary as its
//! only argument, captures stdout and stderr, and hands the text to the
//! classifier. Both pipes are drained concurrently with the wait for exit: a
//! tool that fills the stderr pipe while we are still reading stdout would
//! otherwise block forever.
//!
//! The tool's exit code is not consulted. Pass/fail is decided from the
//! printed lines alone.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::classify::classify_output;
use crate::config::ToolConfig;
use crate::result::TestResults;
use crate::{CancelReason, Error, Result};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Trait for anything that can run a test binary and classify the output
#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// Run the tool against `target`, stopping early if `cancel` fires
    ///
    /// On cancellation the tool is killed and [`Error::Cancelled`] is
    /// returned; no partial results are produced.
    async fn execute_with_cancel(
        &self,
        target: &Path,
        cancel: CancellationToken,
    ) -> Result<TestResults>;

    /// Run the tool against `target` to completion
    async fn execute(&self, target: &Path) -> Result<TestResults> {
        self.execute_with_cancel(target, CancellationToken::new())
            .await
    }
}

/// Executor that launches the test tool as a child process
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    tool: String,
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    /// Create an executor for the given tool path or name
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            timeout: None,
        }
    }

    /// Create an executor from tool configuration
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            tool: config.path.clone(),
            timeout: config.timeout.filter(|t| !t.is_zero()),
        }
    }

    /// Kill the tool and fail with a timeout if it runs longer than `timeout`
    ///
    /// A zero timeout means no limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout).filter(|t| !t.is_zero());
        self
    }

    /// The tool this executor launches
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The run timeout, if one is set
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn build_command(&self, target: &Path) -> Command {
        let mut cmd = Command::new(&self.tool);
        cmd.arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        cmd
    }
}

#[async_trait]
impl TestExecutor for ProcessExecutor {
    async fn execute_with_cancel(
        &self,
        target: &Path,
        cancel: CancellationToken,
    ) -> Result<TestResults> {
        if target.as_os_str().is_empty() {
            return Err(Error::InvalidTarget("path is empty".to_string()));
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled(CancelReason::Requested));
        }

        let mut child = self
            .build_command(target)
            .spawn()
            .map_err(|source| Error::Launch {
                tool: self.tool.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let capture = async {
            tokio::try_join!(child.wait(), read_stream(stdout), read_stream(stderr))
        };

        let outcome = tokio::select! {
            captured = capture => Ok(captured),
            reason = wait_for_cancel(&cancel, self.timeout) => Err(reason),
        };

        match outcome {
            Ok(captured) => {
                let (_status, stdout, stderr) = captured?;
                Ok(classify_output(&stdout, &stderr))
            }
            Err(reason) => {
                // The capture future has been dropped, so both pipes are closed on our side.
                terminate(&mut child).await?;
                Err(Error::Cancelled(reason))
            }
        }
    }
}

/// Read a child pipe to EOF, decoding it lossily as UTF-8
async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> io::Result<String> {
    let mut buf = Vec::new();

    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Resolve once the run should be abandoned
async fn wait_for_cancel(cancel: &CancellationToken, timeout: Option<Duration>) -> CancelReason {
    match timeout {
        Some(limit) => tokio::select! {
            _ = cancel.cancelled() => CancelReason::Requested,
            _ = tokio::time::sleep(limit) => CancelReason::TimedOut(limit),
        },
        None => {
            cancel.cancelled().await;
            CancelReason::Requested
        }
    }
}

/// Kill and reap the child
///
/// A child that already exited counts as terminated.
async fn terminate(child: &mut Child) -> Result<()> {
    match child.kill().await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}
