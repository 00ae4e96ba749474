//! Detached background work.
//!
//! Cache writes and prunes run off the response path. Tasks are tracked so
//! that tests and shutdown can wait for them, and finished tasks are reaped
//! whenever a new one is spawned.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;

#[derive(Debug, Clone, Default)]
pub struct Background {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Wait until every spawned task, including ones spawned meanwhile, has finished.
    ///
    /// Safe to cancel: tasks still running when the returned future is
    /// dropped are detached and run to completion untracked.
    pub async fn flush(&self) {
        loop {
            let taken = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
            let mut draining = Draining(taken);
            if draining.0.is_empty() {
                return;
            }
            while let Some(result) = draining.0.join_next().await {
                if let Err(e) = result {
                    tracing::warn!("background task failed: {}", e);
                }
            }
        }
    }
}

/// Tasks taken out of the shared set by `flush`.
///
/// Dropping a `JoinSet` aborts its tasks, so these are detached instead.
struct Draining(JoinSet<()>);

impl Drop for Draining {
    fn drop(&mut self) {
        self.0.detach_all();
    }
}
