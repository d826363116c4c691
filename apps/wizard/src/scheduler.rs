//! Cancellable delayed tasks for simulated latency and UI timers.
//!
//! Every task gets a child of the scheduler's root token. Shutting the
//! scheduler down or dropping it stops pending tasks before their delay
//! elapses, so nothing lands on state that has been torn down.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Scheduler {
    root: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` after `delay` unless the scheduler is shut down first.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.root.child_token();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    trace!("scheduled task cancelled before firing");
                }
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
    }

    /// Cancels every pending task. Later `schedule` calls are cancelled on arrival.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
