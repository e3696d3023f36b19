//! Producer-facing handle to a coalescing queue.

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use crate::model::{DispatchState, QueueRequest, QueueStats};
use crate::telemetry::metrics::QueueMetrics;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::dispatcher::Dispatcher;
use super::stats::StatsRecorder;

/// A coalescing execution queue.
///
/// Producers submit [`QueueRequest`]s; a single background dispatcher runs
/// the work function at most once at a time. Requests that pile up while a
/// run is in progress collapse into one follow-up run for the newest of them.
///
/// Submission is fire-and-forget. A producer only learns whether its request
/// was accepted, never whether that request was the one executed, executed
/// and failed, or superseded by a later one.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct JobQueue {
    name: Arc<str>,
    capacity: usize,
    sender: mpsc::Sender<QueueRequest>,
    lifecycle: CancellationToken,
    state: watch::Receiver<DispatchState>,
    stats: Arc<StatsRecorder>,
    metrics: QueueMetrics,
}

impl JobQueue {
    /// Create a queue with the default configuration and start its dispatcher.
    ///
    /// Cancelling `lifecycle` stops the dispatcher. Must be called from within
    /// a tokio runtime.
    pub fn new<F, Fut>(work: F, lifecycle: CancellationToken) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_config(work, lifecycle, QueueConfig::default())
    }

    /// Create a queue with an explicit configuration and start its dispatcher.
    pub fn with_config<F, Fut>(work: F, lifecycle: CancellationToken, config: QueueConfig) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(config.name);
        let (sender, mailbox) = mpsc::channel(config.capacity.get());
        let (state_tx, state_rx) = watch::channel(DispatchState::Idle);
        let stats = Arc::new(StatsRecorder::default());
        let metrics = QueueMetrics::new(&name);

        let dispatcher = Dispatcher {
            name: Arc::clone(&name),
            work,
            mailbox,
            lifecycle: lifecycle.clone(),
            state: state_tx,
            stats: Arc::clone(&stats),
            metrics: metrics.clone(),
        };
        tokio::spawn(dispatcher.run());

        Self {
            name,
            capacity: config.capacity.get(),
            sender,
            lifecycle,
            state: state_rx,
            stats,
            metrics,
        }
    }

    /// Submit a request.
    ///
    /// Waits while the mailbox is full. Returns [`Error::QueueStopped`] if the
    /// queue has stopped, including when it stops while this call is waiting
    /// for capacity.
    pub async fn add_queue_request(&self, request: QueueRequest) -> Result<()> {
        if self.lifecycle.is_cancelled() {
            return Err(Error::QueueStopped);
        }
        debug!(queue = %self.name, request_id = %request, "enqueueing request");

        self.stats.record_enqueued();
        let sent = tokio::select! {
            biased;
            _ = self.lifecycle.cancelled() => Err(Error::QueueStopped),
            sent = self.sender.send(request) => sent.map_err(|_| Error::QueueStopped),
        };
        self.settle(sent)
    }

    /// Submit a request from a thread outside the async runtime.
    ///
    /// Blocks while the mailbox is full. A call blocked at the moment the
    /// queue stops returns [`Error::QueueStopped`] once the dispatcher's
    /// in-flight run (if any) has finished.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn blocking_add_queue_request(&self, request: QueueRequest) -> Result<()> {
        if self.lifecycle.is_cancelled() {
            return Err(Error::QueueStopped);
        }
        debug!(queue = %self.name, request_id = %request, "enqueueing request");

        self.stats.record_enqueued();
        let sent = self
            .sender
            .blocking_send(request)
            .map_err(|_| Error::QueueStopped);
        self.settle(sent)
    }

    /// Finish the accounting started by `record_enqueued` once the send resolves.
    fn settle(&self, sent: Result<()>) -> Result<()> {
        match sent {
            Ok(()) => self.metrics.record_enqueued(),
            Err(_) => self.stats.revert_enqueued(),
        }
        sent
    }

    /// Cancel the lifecycle token and wait for the dispatcher to exit.
    ///
    /// An execution already in progress runs to completion first. Buffered
    /// requests are discarded.
    pub async fn shutdown(&self) {
        self.lifecycle.cancel();
        let mut state = self.state.clone();
        // Err means the dispatcher task is gone, which is just as stopped.
        let _ = state.wait_for(DispatchState::is_terminal).await;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current dispatcher state.
    pub fn state(&self) -> DispatchState {
        *self.state.borrow()
    }

    /// Subscribe to dispatcher state changes.
    pub fn watch_state(&self) -> watch::Receiver<DispatchState> {
        self.state.clone()
    }

    /// True once the queue no longer accepts requests.
    pub fn is_stopped(&self) -> bool {
        self.lifecycle.is_cancelled() || self.sender.is_closed()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("state", &self.state())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
