//! Coalescing execution queue: a bounded mailbox feeding a single dispatcher.

mod dispatcher;
pub mod job_queue;
mod stats;

pub use job_queue::JobQueue;
