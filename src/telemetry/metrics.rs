//! Metric instrument factories for jobqueue.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! When no provider is installed the instruments are no-ops.

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("jobqueue")
}

/// Counter: requests accepted into the mailbox.
/// Labels: `queue`.
pub fn requests_enqueued() -> Counter<u64> {
    meter()
        .u64_counter("jobqueue.requests.enqueued")
        .with_description("Number of requests accepted by the queue")
        .build()
}

/// Counter: requests discarded during a drain in favour of a newer one.
/// Labels: `queue`.
pub fn requests_superseded() -> Counter<u64> {
    meter()
        .u64_counter("jobqueue.requests.superseded")
        .with_description("Number of requests collapsed into a later request")
        .build()
}

/// Counter: work function invocations.
/// Labels: `queue`, `result` ("ok" | "error").
pub fn executions() -> Counter<u64> {
    meter()
        .u64_counter("jobqueue.executions")
        .with_description("Number of work function executions")
        .build()
}

/// Histogram: work function duration in milliseconds.
/// Labels: `queue`.
pub fn execution_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("jobqueue.execution.duration_ms")
        .with_description("Work function duration in milliseconds")
        .with_unit("ms")
        .build()
}

/// Instruments used by one dispatcher, built once at startup.
#[derive(Clone)]
pub struct QueueMetrics {
    queue: KeyValue,
    enqueued: Counter<u64>,
    superseded: Counter<u64>,
    executions: Counter<u64>,
    duration: Histogram<f64>,
}

impl QueueMetrics {
    pub fn new(queue: &str) -> Self {
        Self {
            queue: KeyValue::new("queue", queue.to_string()),
            enqueued: requests_enqueued(),
            superseded: requests_superseded(),
            executions: executions(),
            duration: execution_duration_ms(),
        }
    }

    pub fn record_enqueued(&self) {
        self.enqueued.add(1, self.labels());
    }

    pub fn record_superseded(&self, count: u64) {
        if count > 0 {
            self.superseded.add(count, self.labels());
        }
    }

    pub fn record_execution(&self, ok: bool, duration_ms: f64) {
        let result = if ok { "ok" } else { "error" };
        let labels = [self.queue.clone(), KeyValue::new("result", result)];
        self.executions.add(1, &labels);
        self.duration.record(duration_ms, self.labels());
    }

    fn labels(&self) -> &[KeyValue] {
        std::slice::from_ref(&self.queue)
    }
}
