//! Worker pool executing reconciliation jobs.
//!
//! Dispatcher tasks pop due jobs from the [`WorkerQueue`] and spawn one task per job. A
//! semaphore bounds how many jobs run at once, each job runs under a timeout, and stopping the
//! pool lets in-flight jobs finish while no new job starts.

mod config;

pub use config::WorkerPoolConfig;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dioxus_logger::tracing;
use tokio::sync::{Notify, OwnedSemaphorePermit, RwLock, Semaphore};
use tokio::task::JoinHandle;

use crate::server::{
    error::Error,
    model::worker::WorkerJob,
    worker::{
        handler::{retry_delay, WorkerJobHandler},
        queue::WorkerQueue,
    },
};

/// Backoff after a failed queue poll.
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Worker pool handle. Clones control the same pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<WorkerPoolRef>,
}

struct WorkerPoolRef {
    config: WorkerPoolConfig,
    queue: WorkerQueue,
    handler: Arc<WorkerJobHandler>,
    semaphore: Arc<Semaphore>,
    shutdown: Arc<Notify>,
    dispatcher_handles: RwLock<Vec<JoinHandle<()>>>,
}

/// State shared by a dispatcher task.
#[derive(Clone)]
struct Dispatcher {
    id: usize,
    config: WorkerPoolConfig,
    queue: WorkerQueue,
    handler: Arc<WorkerJobHandler>,
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    /// Creates a stopped worker pool, start it with [`WorkerPool::start`].
    ///
    /// # Arguments
    /// - `config` - Concurrency, polling & timeout settings
    /// - `queue` - Queue jobs are popped from
    /// - `handler` - Executes popped jobs
    pub fn new(config: WorkerPoolConfig, queue: WorkerQueue, handler: WorkerJobHandler) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));

        Self {
            inner: Arc::new(WorkerPoolRef {
                config,
                queue,
                handler: Arc::new(handler),
                semaphore,
                shutdown: Arc::new(Notify::new()),
                dispatcher_handles: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Spawns the dispatchers and the queue's stale job cleanup task.
    ///
    /// Returns immediately; calling it on a running pool logs a warning and does nothing.
    pub async fn start(&self) -> Result<(), Error> {
        let mut handles = self.inner.dispatcher_handles.write().await;

        if !handles.is_empty() {
            tracing::warn!("Worker pool is already running");
            return Ok(());
        }

        tracing::info!(
            "Starting worker pool with {} dispatcher(s) (max {} concurrent jobs)",
            self.inner.config.dispatcher_count,
            self.inner.config.max_concurrent_jobs
        );

        self.inner.queue.start_cleanup().await;

        for id in 0..self.inner.config.dispatcher_count {
            let dispatcher = Dispatcher {
                id,
                config: self.inner.config.clone(),
                queue: self.inner.queue.clone(),
                handler: Arc::clone(&self.inner.handler),
                semaphore: Arc::clone(&self.inner.semaphore),
            };

            handles.push(dispatcher.spawn(Arc::clone(&self.inner.shutdown)));
        }

        Ok(())
    }

    /// Stops the dispatchers & cleanup task, waiting up to the shutdown timeout per dispatcher.
    ///
    /// In-flight jobs run to completion. Calling it on a stopped pool does nothing.
    pub async fn stop(&self) -> Result<(), Error> {
        if !self.is_running().await {
            tracing::debug!("Worker pool is already stopped");
            return Ok(());
        }

        tracing::info!("Shutting down worker pool...");

        self.inner.semaphore.close();
        self.inner.shutdown.notify_waiters();
        self.inner.queue.stop_cleanup().await;

        let mut handles = self.inner.dispatcher_handles.write().await;
        let dispatcher_count = handles.len();

        for (i, handle) in handles.drain(..).enumerate() {
            match tokio::time::timeout(self.inner.config.shutdown_timeout(), handle).await {
                Ok(Ok(())) => tracing::debug!("Dispatcher {} stopped cleanly", i),
                Ok(Err(e)) => tracing::error!("Dispatcher {} panicked: {:?}", i, e),
                Err(_) => tracing::warn!("Dispatcher {} did not stop within timeout", i),
            }
        }

        tracing::info!(
            "Worker pool shut down ({} dispatchers stopped, in-flight jobs will complete)",
            dispatcher_count
        );

        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        !self.inner.dispatcher_handles.read().await.is_empty()
    }

    pub async fn dispatcher_count(&self) -> usize {
        self.inner.dispatcher_handles.read().await.len()
    }

    /// Number of jobs that could start right now without waiting for a permit.
    pub fn available_permits(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    pub fn max_concurrent_jobs(&self) -> usize {
        self.inner.config.max_concurrent_jobs
    }

    /// Number of jobs currently executing.
    pub fn active_job_count(&self) -> usize {
        self.inner
            .config
            .max_concurrent_jobs
            .saturating_sub(self.inner.semaphore.available_permits())
    }
}

impl Dispatcher {
    fn spawn(self, shutdown: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::debug!("Dispatcher {} started", self.id);

            loop {
                tokio::select! {
                    // Shutdown takes priority over popping another job
                    biased;

                    _ = shutdown.notified() => break,

                    _ = self.poll() => {}
                }
            }

            tracing::debug!("Dispatcher {} stopped", self.id);
        })
    }

    /// Pops one job and spawns its execution, sleeping when the queue has nothing due.
    async fn poll(&self) {
        match self.queue.pop().await {
            Ok(Some(job)) => match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => {
                    let handler = Arc::clone(&self.handler);
                    let queue = self.queue.clone();
                    let timeout = self.config.job_timeout();

                    tokio::spawn(execute_job(job, handler, queue, timeout, permit));
                }
                Err(_) => {
                    // Pool is stopping, keep the job for the next run
                    if let Err(e) = self.queue.push(job).await {
                        tracing::error!("Dispatcher {} failed to requeue job: {}", self.id, e);
                    }
                }
            },
            Ok(None) => tokio::time::sleep(self.config.poll_interval()).await,
            Err(e) => {
                tracing::error!("Dispatcher {} queue error: {:?}", self.id, e);
                tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Runs a job under a timeout; the permit is released when the job ends.
///
/// Failed jobs that [`retry_delay`] keeps are scheduled again on the queue.
async fn execute_job(
    job: WorkerJob,
    handler: Arc<WorkerJobHandler>,
    queue: WorkerQueue,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
) {
    let delay = match tokio::time::timeout(timeout, handler.handle(&job)).await {
        Ok(Ok(())) => {
            tracing::debug!("Job completed: {}", job);
            return;
        }
        Ok(Err(e)) => {
            tracing::error!("Job failed: {}, error: {}", job, e);
            retry_delay(&job, Some(&e))
        }
        Err(_) => {
            tracing::error!("Job timed out after {} seconds: {}", timeout.as_secs(), job);
            retry_delay(&job, None)
        }
    };

    let Some(delay) = delay else {
        return;
    };

    let retry_at = Utc::now()
        + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::seconds(30));

    match queue.schedule(job.clone(), retry_at).await {
        Ok(_) => tracing::warn!("Rescheduled {} in {} seconds", job, delay.as_secs()),
        Err(e) => tracing::error!("Failed to reschedule {}: {}", job, e),
    }
}
