//! Integration tests for telemetry initialization and span helpers.

use jobqueue::DispatchState;
use jobqueue::telemetry::metrics::QueueMetrics;

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process; a second
    // init in the same test binary returns Err, which is acceptable here.
    let config = jobqueue::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "jobqueue-test".to_string(),
        log_level: "debug".to_string(),
    };
    if let Ok(guard) = jobqueue::telemetry::init_telemetry(config) {
        assert!(!guard.is_exporting());
        guard.force_flush();
    }
}

#[test]
fn dispatch_span_creates_and_records_transition() {
    let span = jobqueue::telemetry::dispatch::start_dispatch_span("builds");
    span.record("request.id", "req-42");
    span.record("dispatch.superseded", 3u64);
    jobqueue::telemetry::dispatch::record_state_transition(
        &span,
        DispatchState::Draining,
        DispatchState::Executing,
    );
}

#[test]
fn queue_metrics_record_without_a_provider() {
    let metrics = QueueMetrics::new("builds");
    metrics.record_enqueued();
    metrics.record_superseded(0);
    metrics.record_superseded(2);
    metrics.record_execution(true, 1.5);
    metrics.record_execution(false, 0.2);
}
