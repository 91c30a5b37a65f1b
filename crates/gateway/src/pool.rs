//! WorkerPool - host-supplied executor for flush tasks and periodic checks

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::GatewayError;

/// Worker pool handed to the gateway at start
///
/// Wraps a tokio runtime handle. The gateway only spawns onto it; the
/// runtime itself stays owned by the host.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    handle: Handle,
}

impl WorkerPool {
    /// Create a pool backed by the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running in
    pub fn current() -> Result<Self, GatewayError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| GatewayError::NoRuntime)
    }

    /// Submit a task for execution
    pub fn submit<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task)
    }

    /// Run `task` after `initial_delay`, then again `period` after each run
    pub fn schedule_fixed_delay<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        mut task: F,
    ) -> PeriodicTask
    where
        F: FnMut() + Send + 'static,
    {
        let handle = self.handle.spawn(async move {
            tokio::time::sleep(initial_delay).await;
            loop {
                task();
                tokio::time::sleep(period).await;
            }
        });

        PeriodicTask { handle }
    }
}

/// Cancellation handle of a periodic task
#[derive(Debug)]
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Stop future runs; a run in progress is not interrupted
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
