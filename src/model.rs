//! Core data model.
//!
//! A queue request is a trigger: "run the work function". It carries only an
//! identifier used for logging. The dispatcher moves through a small set of
//! states while it turns requests into executions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Queue Request
// ---------------------------------------------------------------------------

/// One execution trigger submitted to a [`JobQueue`](crate::queue::JobQueue).
///
/// Requests are immutable once created. The dispatcher either executes a
/// request or discards it in favour of a newer one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueRequest {
    id: String,
}

impl QueueRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Create a request with a random UUID as its identifier.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for QueueRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

// ---------------------------------------------------------------------------
// Dispatcher State
// ---------------------------------------------------------------------------

/// Dispatcher lifecycle state.
///
/// ```text
/// Idle → Draining → Executing → Idle
///   any state → Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Waiting for the next request.
    Idle,
    /// Collapsing the buffered backlog down to its newest request.
    Draining,
    /// The work function is running.
    Executing,
    /// Cancelled or closed. Terminal.
    Stopped,
}

impl DispatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Draining => "draining",
            Self::Executing => "executing",
            Self::Stopped => "stopped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DispatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "draining" => Ok(Self::Draining),
            "executing" => Ok(Self::Executing),
            "stopped" => Ok(Self::Stopped),
            _ => Err(format!("unknown dispatch state: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Point-in-time counters for a queue.
///
/// `enqueued` counts accepted requests. Every accepted request eventually
/// lands in exactly one of `executed` or `superseded`, unless it was still
/// buffered when the queue stopped. Any snapshot satisfies
/// `executed + superseded <= enqueued`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub enqueued: u64,
    pub executed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub superseded: u64,
    /// ID of the most recent request handed to the work function.
    pub last_dispatched: Option<String>,
}
