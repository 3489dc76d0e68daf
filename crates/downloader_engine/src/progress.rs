use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex, PoisonError};

use crate::{CancellationSignal, EngineEvent, FetchResult, RunId};

/// Point-in-time copy of the results gathered so far in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    completed: Vec<FetchResult>,
    percent_complete: u8,
}

impl ProgressSnapshot {
    pub fn new(completed: Vec<FetchResult>, total: usize) -> Self {
        let percent_complete = percent_complete(completed.len(), total);
        Self {
            completed,
            percent_complete,
        }
    }

    pub fn completed(&self) -> &[FetchResult] {
        &self.completed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn percent_complete(&self) -> u8 {
        self.percent_complete
    }

}

/// `floor(completed * 100 / total)`, clamped to 100. An empty run counts as done.
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = completed.min(total) * 100 / total;
    percent as u8
}

/// Receives progress snapshots from whichever thread or task produced them.
pub trait ProgressSink: Send + Sync {
    fn report(&self, snapshot: ProgressSnapshot);
}

/// Forwards snapshots to the engine event channel, tagged with their run.
pub struct ChannelProgressSink {
    run_id: RunId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(run_id: RunId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { run_id, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn report(&self, snapshot: ProgressSnapshot) {
        let _ = self.tx.send(EngineEvent::Progress {
            run_id: self.run_id,
            snapshot,
        });
    }
}

/// Forwards to an inner sink and triggers `cancel` once the `after`-th
/// snapshot has been forwarded.
pub(crate) struct CancelAfterSink<'a> {
    inner: &'a dyn ProgressSink,
    cancel: &'a CancellationSignal,
    after: usize,
    reported: AtomicUsize,
}

impl<'a> CancelAfterSink<'a> {
    pub(crate) fn new(
        inner: &'a dyn ProgressSink,
        cancel: &'a CancellationSignal,
        after: usize,
    ) -> Self {
        Self {
            inner,
            cancel,
            after,
            reported: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for CancelAfterSink<'_> {
    fn report(&self, snapshot: ProgressSnapshot) {
        self.inner.report(snapshot);
        if self.reported.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            self.cancel.trigger();
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&self, _snapshot: ProgressSnapshot) {}
}

/// Mutex-guarded output list shared by concurrent appenders.
pub(crate) struct ResultCollector {
    total: usize,
    results: Mutex<Vec<FetchResult>>,
}

impl ResultCollector {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            results: Mutex::new(Vec::with_capacity(total)),
        }
    }

    /// Appends and returns the snapshot taken under the same lock, so
    /// snapshot sizes are strictly increasing across callers.
    pub(crate) fn push(&self, result: FetchResult) -> ProgressSnapshot {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.push(result);
        ProgressSnapshot::new(results.clone(), self.total)
    }

    pub(crate) fn push_quiet(&self, result: FetchResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    pub(crate) fn into_results(self) -> Vec<FetchResult> {
        self.results
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
