//! Shared counters behind [`QueueStats`].

use crate::model::{QueueRequest, QueueStats};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Written by the dispatcher and producers, read through `JobQueue::stats`.
///
/// Producers count a request before handing it to the mailbox, and the
/// channel orders that before the dispatcher's release stores. Loading the
/// dispatcher counters first with acquire keeps
/// `executed + superseded <= enqueued` in every snapshot.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    enqueued: AtomicU64,
    executed: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    superseded: AtomicU64,
    last_dispatched: Mutex<Option<String>>,
}

impl StatsRecorder {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Undo `record_enqueued` for a request the mailbox refused.
    pub(crate) fn revert_enqueued(&self) {
        self.enqueued.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatch(&self, request: &QueueRequest, superseded: u64) {
        self.superseded.fetch_add(superseded, Ordering::Release);
        let mut last = self
            .last_dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(request.id().to_string());
    }

    pub(crate) fn record_outcome(&self, ok: bool) {
        if ok {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        // Bumped last so `executed == succeeded + failed` holds for readers
        // that observe the new `executed` value.
        self.executed.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn snapshot(&self) -> QueueStats {
        let executed = self.executed.load(Ordering::Acquire);
        let superseded = self.superseded.load(Ordering::Acquire);
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Acquire),
            executed,
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            superseded,
            last_dispatched: self
                .last_dispatched
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
