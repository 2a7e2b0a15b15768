//! Worker queue configuration for TTL and cleanup settings.
//!
//! Jobs exceeding the TTL are removed by the periodic cleanup task so that jobs left behind by
//! a crashed or long-stopped worker do not execute against outdated assumptions; the periodic
//! resync re-enqueues whatever still needs reconciling.

use std::time::Duration;

const DEFAULT_QUEUE_NAME: &str = "bifrost:sync:queue";

/// Maximum age for jobs in the queue before they're considered stale (1 hour)
const DEFAULT_JOB_TTL: Duration = Duration::from_secs(3600);

/// Cleanup will run at most once per this interval (5 minutes)
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Configuration for the worker queue.
#[derive(Debug, Clone)]
pub struct WorkerQueueConfig {
    /// Redis key name for the job queue sorted set
    pub queue_name: String,
    /// Maximum age for jobs before considered stale and removed by cleanup
    pub job_ttl: Duration,
    /// How often the cleanup task runs to remove stale jobs
    pub cleanup_interval: Duration,
}

impl WorkerQueueConfig {
    fn new() -> Self {
        Self {
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
            job_ttl: DEFAULT_JOB_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl Default for WorkerQueueConfig {
    fn default() -> Self {
        Self::new()
    }
}
