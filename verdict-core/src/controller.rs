//! Single-flight run control
//!
//! Front-ends trigger runs from user input, so a second trigger can arrive
//! while a run is still going. [`RunController`] rejects it with
//! [`Error::Busy`] instead of starting an overlapping run, keeps the
//! cancellation token of the active run so it can be aborted, and logs at
//! the call boundary (the executor itself stays silent).

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::executor::TestExecutor;
use crate::result::TestResults;
use crate::{Error, Result};

/// Runs tests through an executor, at most one at a time
#[derive(Debug)]
pub struct RunController<E> {
    executor: E,
    /// Token of the in-flight run, if any
    active: Mutex<Option<CancellationToken>>,
}

/// Clears the in-flight slot when a run finishes or its future is dropped
struct InFlight<'a> {
    active: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.active) = None;
    }
}

fn lock(active: &Mutex<Option<CancellationToken>>) -> MutexGuard<'_, Option<CancellationToken>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: TestExecutor> RunController<E> {
    /// Create a controller that owns `executor`
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            active: Mutex::new(None),
        }
    }

    /// Get the underlying executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Check if a run is in flight
    pub fn is_running(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Cancel the in-flight run
    ///
    /// Returns `false` if nothing was running.
    pub fn cancel(&self) -> bool {
        match lock(&self.active).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Run the tests in `target`
    ///
    /// Fails with [`Error::Busy`] if another run is in flight.
    pub async fn run(&self, target: impl AsRef<Path>) -> Result<TestResults> {
        let target = target.as_ref();
        let token = self.begin()?;
        let _in_flight = InFlight {
            active: &self.active,
        };

        info!(path = %target.display(), "Starting test run");

        let outcome = self.executor.execute_with_cancel(target, token).await;

        match &outcome {
            Ok(results) => info!(
                path = %target.display(),
                entries = results.len(),
                passed = results.passed_count(),
                failed = results.failed_count(),
                "Test run finished"
            ),
            Err(e) if e.is_cancelled() => warn!(path = %target.display(), "{}", e),
            Err(e) => error!(path = %target.display(), error = %e, "Test run failed"),
        }

        outcome
    }

    /// Run the tests in `target`, folding any error into a single `Failed` entry
    pub async fn run_or_report(&self, target: impl AsRef<Path>) -> TestResults {
        match self.run(target).await {
            Ok(results) => results,
            Err(e) => {
                if matches!(e, Error::Busy) {
                    warn!("{}", e);
                }
                TestResults::from_error(&e)
            }
        }
    }

    fn begin(&self) -> Result<CancellationToken> {
        let mut active = lock(&self.active);
        if active.is_some() {
            return Err(Error::Busy);
        }

        let token = CancellationToken::new();
        *active = Some(token.clone());
        Ok(token)
    }
}
