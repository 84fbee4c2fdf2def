//! Mount-scoped tasks
//!
//! Screen fetches run as abortable tasks owned by the scope of the screen that
//! started them. Closing or dropping the scope aborts whatever is still in
//! flight, so a late response is never applied to a screen that is gone.

use futures::future::{AbortHandle, Abortable, Aborted};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Owner of the tasks started while a screen is mounted
#[derive(Debug, Default)]
pub struct MountScope {
    handles: Mutex<Vec<TrackedTask>>,
    closed: Arc<AtomicBool>,
}

/// Cancellation handle plus the runtime handle used to spot finished tasks
#[derive(Debug)]
struct TrackedTask {
    abort: AbortHandle,
    task: tokio::task::AbortHandle,
}

/// Handle to a task spawned in a [`MountScope`]
#[derive(Debug)]
pub struct ScreenTask<T> {
    handle: JoinHandle<Result<T, Aborted>>,
}

impl<T> ScreenTask<T> {
    /// Wait for the task. `None` when it was cancelled or panicked.
    pub async fn join(self) -> Option<T> {
        match self.handle.await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(Aborted)) => None,
            Err(e) => {
                debug!(error = %e, "Screen task did not complete");
                None
            }
        }
    }
}

impl MountScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` on the current tokio runtime, tied to this scope.
    ///
    /// Spawning into a closed scope yields a task that is already cancelled.
    pub fn spawn<F, T>(&self, future: F) -> ScreenTask<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (abort_handle, registration) = AbortHandle::new_pair();
        let task = Abortable::new(future, registration);

        if self.is_closed() {
            abort_handle.abort();
        }

        let handle = tokio::spawn(task);

        // Checked under the lock so a concurrent close cannot miss this task
        match self.handles.lock() {
            Ok(mut handles) if !self.is_closed() => {
                handles.retain(|tracked| !tracked.task.is_finished());
                handles.push(TrackedTask {
                    abort: abort_handle,
                    task: handle.abort_handle(),
                });
            }
            _ => abort_handle.abort(),
        }

        ScreenTask { handle }
    }

    /// Number of tasks still tracked by this scope
    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .map(|mut handles| {
                handles.retain(|tracked| !tracked.task.is_finished());
                handles.len()
            })
            .unwrap_or(0)
    }

    /// Flag shared with tasks that need to check liveness themselves
    pub fn liveness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Abort every outstanding task; later spawns are cancelled immediately
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut handles) = self.handles.lock() {
            debug!(tasks = handles.len(), "Closing mount scope");
            for tracked in handles.drain(..) {
                tracked.abort.abort();
            }
        }
    }
}

impl Drop for MountScope {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completed_tasks_yield_their_value() {
        let scope = MountScope::new();
        let task = scope.spawn(async { 42 });
        assert_eq!(task.join().await, Some(42));
    }

    #[tokio::test]
    async fn closing_the_scope_cancels_pending_tasks() {
        let scope = MountScope::new();
        let task = scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "late response"
        });

        scope.close();
        assert!(scope.is_closed());
        assert_eq!(task.join().await, None);
    }

    #[tokio::test]
    async fn dropping_the_scope_cancels_pending_tasks() {
        let task = {
            let scope = MountScope::new();
            scope.spawn(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
            })
        };
        assert_eq!(task.join().await, None);
    }

    #[tokio::test]
    async fn spawning_into_a_closed_scope_is_a_no_op() {
        let scope = MountScope::new();
        scope.close();
        let task = scope.spawn(async { 1 });
        assert_eq!(task.join().await, None);
    }

    #[tokio::test]
    async fn finished_tasks_are_no_longer_tracked() {
        let scope = MountScope::new();
        for i in 0..5 {
            assert_eq!(scope.spawn(async move { i }).join().await, Some(i));
        }
        assert_eq!(scope.pending(), 0);

        let slow = scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert_eq!(scope.pending(), 1);

        scope.close();
        assert_eq!(scope.pending(), 0);
        assert_eq!(slow.join().await, None);
    }

    #[tokio::test]
    async fn liveness_flag_tracks_close() {
        let scope = MountScope::new();
        let flag = scope.liveness();
        assert!(!flag.load(Ordering::SeqCst));
        drop(scope);
        assert!(flag.load(Ordering::SeqCst));
    }
}
