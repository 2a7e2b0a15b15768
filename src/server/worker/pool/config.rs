use std::time::Duration;

/// Concurrent jobs handled by a single dispatcher before another one is added
const JOBS_PER_DISPATCHER: usize = 40;

/// Configuration for the worker pool
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Maximum number of reconciliations running at once.
    ///
    /// Each job holds a database connection and makes remote API calls, keep this below the
    /// PostgreSQL pool size.
    pub max_concurrent_jobs: usize,

    /// Number of tasks popping jobs from the queue, one per 40 concurrent jobs (minimum 1).
    pub dispatcher_count: usize,

    /// Sleep between polls while no job is due (milliseconds).
    pub poll_interval_ms: u64,

    /// A job still running after this long is abandoned (seconds).
    ///
    /// An abandoned reconciliation is retried by the next periodic resync.
    pub job_timeout_seconds: u64,

    /// How long [`super::WorkerPool::stop`] waits for each dispatcher (seconds).
    pub shutdown_timeout_seconds: u64,
}

impl WorkerPoolConfig {
    pub fn new(max_concurrent_jobs: usize) -> Self {
        let max_concurrent_jobs = max_concurrent_jobs.max(1);
        let dispatcher_count = max_concurrent_jobs.div_ceil(JOBS_PER_DISPATCHER);

        Self {
            max_concurrent_jobs,
            dispatcher_count,
            poll_interval_ms: 100,
            job_timeout_seconds: 60,
            shutdown_timeout_seconds: 5,
        }
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self::new(4)
    }
}
