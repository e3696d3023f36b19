//! Dispatch span helpers.
//!
//! Provides span creation and state-transition recording for requests
//! flowing through a queue's dispatcher.

use crate::model::DispatchState;
use tracing::Span;

/// Start a span covering one dispatch cycle, from the first arrival through
/// the end of the resulting execution.
///
/// `request.id` and `dispatch.superseded` are declared empty and filled in
/// once the drain step knows which request won and how many it discarded.
pub fn start_dispatch_span(queue: &str) -> Span {
    tracing::info_span!(
        "queue.dispatch",
        "queue.name" = queue,
        "request.id" = tracing::field::Empty,
        "dispatch.superseded" = tracing::field::Empty,
    )
}

/// Record a dispatcher state transition on the given span.
pub fn record_state_transition(span: &Span, from: DispatchState, to: DispatchState) {
    span.in_scope(|| {
        tracing::debug!(from = %from, to = %to, "state_transition");
    });
}
