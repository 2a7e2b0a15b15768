//! Worker queue for reconciliation jobs
//!
//! Jobs are stored in a Valkey/Redis sorted set scored by the timestamp (in milliseconds) at
//! which they become due. The member is the job's identity, its JSON encoding, which makes the
//! set itself the duplicate guard: pushing a job already waiting in the queue is a no-op.
//!
//! ## TTL and Cleanup
//!
//! Jobs older than the configured TTL are considered stale:
//! - A background task started with [`WorkerQueue::start_cleanup`] removes them periodically
//! - Manual cleanup can be triggered via [`WorkerQueue::cleanup_stale_jobs`]
pub mod config;
mod lua;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dioxus_logger::tracing;
use fred::prelude::*;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::server::{error::Error, model::worker::WorkerJob, worker::queue::config::WorkerQueueConfig};

use lua::{CLEANUP_STALE_JOBS_SCRIPT, POP_DUE_JOB_SCRIPT, PUSH_JOB_SCRIPT};

/// Redis-backed job queue. Clones share the connection pool & cleanup task.
#[derive(Clone)]
pub struct WorkerQueue {
    pool: Pool,
    config: WorkerQueueConfig,
    cleanup_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl WorkerQueue {
    pub fn new(pool: Pool) -> Self {
        Self::with_config(pool, WorkerQueueConfig::default())
    }

    /// Create a new WorkerQueue with custom configuration (useful for testing)
    pub fn with_config(pool: Pool, config: WorkerQueueConfig) -> Self {
        Self {
            pool,
            config,
            cleanup_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Push a job to be executed as soon as possible
    ///
    /// # Returns
    /// - `Ok(true)` - The job was added to the queue
    /// - `Ok(false)` - A job with the same identity is already queued
    pub async fn push(&self, job: WorkerJob) -> Result<bool, Error> {
        self.schedule(job, Utc::now()).await
    }

    /// Schedule job to be executed at provided time
    ///
    /// # Returns
    /// - `Ok(true)` - The job was added to the queue
    /// - `Ok(false)` - A job with the same identity is already queued, its time is kept
    pub async fn schedule(&self, job: WorkerJob, time: DateTime<Utc>) -> Result<bool, Error> {
        let identity = job.identity()?;
        let score = time.timestamp_millis() as f64;

        let result: i64 = self
            .pool
            .eval(
                PUSH_JOB_SCRIPT,
                vec![&self.config.queue_name],
                vec![identity, score.to_string()],
            )
            .await?;

        Ok(result == 1)
    }

    /// Retrieve & remove the earliest due job from queue
    pub async fn pop(&self) -> Result<Option<WorkerJob>, Error> {
        let now = Utc::now().timestamp_millis() as f64;

        let identity: Option<String> = self
            .pool
            .eval(
                POP_DUE_JOB_SCRIPT,
                vec![&self.config.queue_name],
                vec![now.to_string()],
            )
            .await?;

        match identity {
            Some(identity) => Ok(Some(WorkerJob::from_identity(&identity)?)),
            None => Ok(None),
        }
    }

    /// Number of jobs in the queue, due or not
    pub async fn len(&self) -> Result<u64, Error> {
        Ok(self.pool.zcard(&self.config.queue_name).await?)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// Remove all jobs older than the configured TTL from the queue
    ///
    /// # Returns
    /// Returns the number of stale jobs that were removed from the queue.
    pub async fn cleanup_stale_jobs(&self) -> Result<u64, Error> {
        Self::cleanup_stale_jobs_internal(&self.pool, &self.config).await
    }

    async fn cleanup_stale_jobs_internal(
        pool: &Pool,
        config: &WorkerQueueConfig,
    ) -> Result<u64, Error> {
        let cutoff_timestamp = Utc::now().timestamp_millis() - config.job_ttl.as_millis() as i64;
        let cutoff_score = cutoff_timestamp as f64;

        let removed: i64 = pool
            .eval(
                CLEANUP_STALE_JOBS_SCRIPT,
                vec![&config.queue_name],
                vec![cutoff_score.to_string()],
            )
            .await?;

        if removed > 0 {
            tracing::info!("Cleaned up {} stale jobs from queue", removed);
        }

        Ok(removed as u64)
    }

    /// Starts the periodic stale job cleanup task
    ///
    /// Idempotent, a running cleanup task is kept.
    pub async fn start_cleanup(&self) {
        let mut handle = self.cleanup_handle.lock().await;
        if handle.is_some() {
            return;
        }

        let pool = self.pool.clone();
        let config = self.config.clone();

        *handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.cleanup_interval);

            loop {
                interval.tick().await;

                if let Err(e) = Self::cleanup_stale_jobs_internal(&pool, &config).await {
                    tracing::warn!("Failed to cleanup stale jobs: {}", e);
                }
            }
        }));
    }

    /// Stops the periodic stale job cleanup task
    pub async fn stop_cleanup(&self) {
        if let Some(handle) = self.cleanup_handle.lock().await.take() {
            handle.abort();
        }
    }

    /// Whether the periodic cleanup task is running
    pub async fn is_cleanup_running(&self) -> bool {
        self.cleanup_handle.lock().await.is_some()
    }
}
