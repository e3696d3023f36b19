//! Dispatcher loop: waits for requests, collapses the backlog to the newest
//! one, and runs the work function. The only reader of the mailbox.

use crate::model::{DispatchState, QueueRequest};
use crate::telemetry::dispatch::{record_state_transition, start_dispatch_span};
use crate::telemetry::metrics::QueueMetrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info};

use super::stats::StatsRecorder;

pub(crate) struct Dispatcher<F> {
    pub(crate) name: Arc<str>,
    pub(crate) work: F,
    pub(crate) mailbox: mpsc::Receiver<QueueRequest>,
    pub(crate) lifecycle: CancellationToken,
    pub(crate) state: watch::Sender<DispatchState>,
    pub(crate) stats: Arc<StatsRecorder>,
    pub(crate) metrics: QueueMetrics,
}

impl<F, Fut> Dispatcher<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    /// Run until the lifecycle token is cancelled or every sender is gone.
    pub(crate) async fn run(mut self) {
        info!(queue = %self.name, "dispatcher started");

        loop {
            let first = tokio::select! {
                biased;
                _ = self.lifecycle.cancelled() => {
                    info!(queue = %self.name, "lifecycle cancelled, stopping dispatcher");
                    break;
                }
                next = self.mailbox.recv() => match next {
                    Some(request) => request,
                    None => {
                        info!(queue = %self.name, "all queue handles dropped, stopping dispatcher");
                        break;
                    }
                },
            };

            let span = start_dispatch_span(&self.name);
            self.enter(&span, DispatchState::Idle, DispatchState::Draining);
            let (latest, superseded) = self.drain(first);
            span.record("request.id", latest.id());
            span.record("dispatch.superseded", superseded);

            // Cancellation may have landed while draining; never start a new run after it.
            if self.lifecycle.is_cancelled() {
                info!(
                    queue = %self.name,
                    request_id = %latest,
                    "lifecycle cancelled before dispatch, dropping request"
                );
                record_state_transition(&span, DispatchState::Draining, DispatchState::Stopped);
                break;
            }

            self.enter(&span, DispatchState::Draining, DispatchState::Executing);
            self.execute(&span, latest, superseded).await;

            if self.lifecycle.is_cancelled() {
                info!(
                    queue = %self.name,
                    "lifecycle cancelled during execution, run was allowed to finish"
                );
                record_state_transition(&span, DispatchState::Executing, DispatchState::Stopped);
                break;
            }
            self.enter(&span, DispatchState::Executing, DispatchState::Idle);
        }

        // Wakes producers waiting on capacity with a send error.
        self.mailbox.close();
        self.state.send_replace(DispatchState::Stopped);
        info!(queue = %self.name, "dispatcher stopped");
    }

    /// Consume the requests buffered right now and keep only the newest.
    ///
    /// The backlog size is read once, so a steady stream of producers can't
    /// keep the drain going; later arrivals wait for the next cycle.
    fn drain(&mut self, first: QueueRequest) -> (QueueRequest, u64) {
        let backlog = self.mailbox.len();
        let mut latest = first;
        let mut superseded = 0;

        for _ in 0..backlog {
            let Ok(next) = self.mailbox.try_recv() else {
                break;
            };
            debug!(
                queue = %self.name,
                request_id = %latest,
                superseded_by = %next,
                "request superseded"
            );
            latest = next;
            superseded += 1;
        }

        (latest, superseded)
    }

    /// Publish a non-terminal state and record the transition on `span`.
    ///
    /// `Stopped` is published only after the mailbox is closed, in `run`.
    fn enter(&self, span: &Span, from: DispatchState, to: DispatchState) {
        self.state.send_replace(to);
        record_state_transition(span, from, to);
    }

    /// Run the work function once for `request`. Failures are logged and
    /// counted, never retried.
    async fn execute(&self, span: &Span, request: QueueRequest, superseded: u64) {
        self.stats.record_dispatch(&request, superseded);
        self.metrics.record_superseded(superseded);

        async {
            let started = Instant::now();
            // A panicking work function surfaces as a JoinError instead of
            // taking the dispatcher down with it.
            let outcome = match tokio::spawn((self.work)().in_current_span()).await {
                Ok(result) => result,
                Err(join_err) => Err(anyhow::anyhow!("work function panicked: {join_err}")),
            };
            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Ok(()) => {
                    info!(
                        queue = %self.name,
                        request_id = %request,
                        superseded,
                        duration_ms,
                        "execution completed"
                    );
                    self.stats.record_outcome(true);
                    self.metrics.record_execution(true, duration_ms);
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    error!(
                        queue = %self.name,
                        request_id = %request,
                        duration_ms,
                        error = %message,
                        "execution failed"
                    );
                    self.stats.record_outcome(false);
                    self.metrics.record_execution(false, duration_ms);
                }
            }
        }
        .instrument(span.clone())
        .await
    }
}
