//! Verdict Core - run an external test tool and classify what it prints
//!
//! The [`ProcessExecutor`] launches the configured tool against a compiled
//! test binary, drains both output streams concurrently, and folds the
//! captured text into an ordered [`TestResults`] sequence. The
//! [`RunController`] wraps an executor with single-flight semantics and
//! cancellation for front-ends that trigger runs interactively.

pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod result;

pub use classify::{classify_line, classify_output, ERROR_PREFIX, LINE_TERMINATOR};
pub use config::{Config, Resolved, Source, ToolConfig};
pub use controller::RunController;
pub use error::{CancelReason, Error, Result};
pub use executor::{ProcessExecutor, TestExecutor};
pub use result::{TestResult, TestResults, TestStatus};

pub use tokio_util::sync::CancellationToken;
