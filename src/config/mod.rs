//! Typed configuration.
//!
//! `QueueConfig` sizes a single queue. `Config` is the process-level view,
//! loaded once from environment variables at startup and failing fast on
//! malformed values.

use crate::error::{Error, Result};
use std::num::NonZeroUsize;

/// Default mailbox capacity.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(100).unwrap();

/// Default queue name used in logs and metric labels.
pub const DEFAULT_QUEUE_NAME: &str = "job-queue";

/// Settings for one [`JobQueue`](crate::queue::JobQueue).
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Label attached to log events, spans and metrics.
    pub name: String,
    /// Maximum number of buffered requests before producers wait.
    pub capacity: NonZeroUsize,
}

impl QueueConfig {
    /// Build a config, rejecting a zero capacity.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Error::Config("queue capacity must be greater than zero".to_string()))?;
        Ok(Self {
            name: name.into(),
            capacity,
        })
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_QUEUE_NAME.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub queue_name: String,
    pub queue_capacity: NonZeroUsize,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let queue_capacity = match std::env::var("JOBQUEUE_CAPACITY") {
            Ok(raw) => parse_capacity(&raw)?,
            Err(_) => DEFAULT_CAPACITY,
        };

        Ok(Self {
            queue_name: std::env::var("JOBQUEUE_NAME")
                .unwrap_or_else(|_| DEFAULT_QUEUE_NAME.to_string()),
            queue_capacity,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            name: self.queue_name.clone(),
            capacity: self.queue_capacity,
        }
    }
}

fn parse_capacity(raw: &str) -> Result<NonZeroUsize> {
    raw.trim().parse::<NonZeroUsize>().map_err(|e| {
        Error::Config(format!(
            "JOBQUEUE_CAPACITY must be a positive integer, got {raw:?}: {e}"
        ))
    })
}
