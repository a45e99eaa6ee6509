//! Fire-and-forget scheduling for the two asynchronous steps: the
//! clipboard write and the toast's timed removal.
//!
//! Page handles are not `Send`, so tasks are local to the UI thread.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed task that runs on the UI thread.
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Spawns local tasks and provides timers.
pub trait Runtime: Clone + 'static {
    /// Run `task` to completion in the background. Nothing observes it.
    fn spawn(&self, task: LocalTask);

    /// A future that resolves after `duration`.
    fn sleep(&self, duration: Duration) -> LocalTask;
}

/// Native runtime backed by tokio.
///
/// `spawn` uses `tokio::task::spawn_local`, so it must be called from inside
/// a `tokio::task::LocalSet`; outside one it panics.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntime;

#[cfg(not(target_arch = "wasm32"))]
impl Runtime for TokioRuntime {
    fn spawn(&self, task: LocalTask) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalTask {
        Box::pin(tokio::time::sleep(duration))
    }
}
