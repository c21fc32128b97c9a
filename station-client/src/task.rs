//! Cancellable task scope owned by each mounted dashboard.
//!
//! Background loads are spawned into the scope; user actions are awaited
//! through [`TaskScope::run`]. Cancelling the scope (or dropping it) stops
//! everything still in flight, so no response is applied to a view that has
//! been torn down.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct TaskScope {
    cancel: CancellationToken,
    tasks: Mutex<JoinSet<()>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token observed by every task in this scope.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Spawn a background task that stops when the scope is cancelled.
    ///
    /// Must be called from within a tokio runtime. Spawning into a cancelled
    /// scope is a no-op.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            tracing::debug!("Scope cancelled, not spawning");
            return;
        }
        let cancel = self.cancel.clone();
        let mut tasks = lock(&self.tasks);
        // Reap finished tasks so the set does not grow unbounded
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = future => {}
            }
        });
    }

    /// Await `future` unless the scope is cancelled first.
    pub async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = future => result,
        }
    }

    /// Wait until every spawned task (including ones spawned meanwhile) is done.
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *lock(&self.tasks));
            if tasks.is_empty() {
                break;
            }
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::warn!("Background task panicked: {}", e);
                    }
                }
            }
        }
    }

    /// Cancel the scope and abort outstanding tasks.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("Cancelling task scope");
        }
        self.cancel.cancel();
        lock(&self.tasks).abort_all();
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
