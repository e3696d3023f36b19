//! # jobqueue
//!
//! Coalescing execution queue. Producers submit requests to run a work
//! function; at most one run is in flight, and requests that arrive during a
//! run collapse into a single follow-up run for the newest one.
//!
//! Built on tokio channels with tracing and OpenTelemetry observability.

pub mod config;
pub mod error;
pub mod model;
pub mod queue;
pub mod telemetry;

pub use error::{Error, Result};
pub use model::{DispatchState, QueueRequest, QueueStats};
pub use queue::JobQueue;
