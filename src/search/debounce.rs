use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delayed one-shot commit with supersede-on-resubmit semantics.
///
/// Every [`submit`](Debouncer::submit) restarts the clock: the commit closure
/// runs only if no newer submission (and no cancel) arrived while the delay
/// elapsed. Timer tasks are guarded by a generation counter, so a superseded
/// task that still wakes up simply finds its generation stale and does
/// nothing.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

/// Handle to one pending submission.
pub struct DebounceHandle {
    generation: u64,
    counter: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `commit` to run after the delay, superseding any pending
    /// submission on this debouncer. Must be called within a tokio runtime.
    pub fn submit<F>(&self, commit: F) -> DebounceHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let counter = Arc::clone(&self.generation);
        let delay = self.delay;

        let task = tokio::spawn({
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(delay).await;
                if counter.load(Ordering::SeqCst) == generation {
                    commit();
                }
            }
        });

        DebounceHandle {
            generation,
            counter,
            task,
        }
    }
}

impl DebounceHandle {
    /// Cancel this submission if it is still the pending one. A handle for
    /// an already superseded submission is a no-op.
    pub fn cancel(&self) {
        let _ = self.counter.compare_exchange(
            self.generation,
            self.generation + 1,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.task.abort();
    }
}
