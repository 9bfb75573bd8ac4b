//! Serialized dispatch onto the UI-owning thread.
//!
//! The partner SDK's initialization and consent APIs sit on top of a web
//! rendering component that is not thread-safe; every call to them must go
//! through one designated thread. [`UiDispatcher`] models that thread as a
//! single tokio task draining a job queue - one consumer, so jobs execute in
//! submission order with no interleaving.

use tokio::sync::mpsc;
use tracing::{trace, warn};

type Job = Box<dyn FnOnce() + Send>;

/// Handle to the single UI-thread job queue.
///
/// Cheap to clone; all clones feed the same queue. Dropping every clone shuts
/// the task down once the queue drains.
#[derive(Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl UiDispatcher {
    /// Spawn the dispatcher task on the current tokio runtime.
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
            trace!("ui dispatcher drained and stopped");
        });
        Self { tx }
    }

    /// Queue a job for serialized execution.
    ///
    /// Jobs submitted after the dispatcher task has stopped are dropped with
    /// a warning; there is nothing left to run them on.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Box::new(job)).is_err() {
            warn!("ui dispatcher is gone, dropping job");
        }
    }
}

impl std::fmt::Debug for UiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiDispatcher")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn jobs_run_in_submission_order() {
        let dispatcher = UiDispatcher::spawn();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        for i in 0..10 {
            let log = log.clone();
            dispatcher.dispatch(move || log.lock().unwrap().push(i));
        }

        // Let the dispatcher task drain.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(*log.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn clones_share_one_queue() {
        let dispatcher = UiDispatcher::spawn();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let d = dispatcher.clone();
            let counter = counter.clone();
            d.dispatch(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }
}
