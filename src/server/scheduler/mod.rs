//! Periodic full resync.
//!
//! Event notifications keep remote memberships current under normal operation; the resync job
//! enqueues a reconciliation for every linked account on a cron schedule so that drift caused
//! by missed events, manual edits on the remote side or deferred reconciliations is corrected.

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    error::Error,
    service::{notify::linked_account_jobs, registry::ServiceRegistry},
    worker::WorkerQueue,
};

/// Cron based scheduler for the periodic resync.
pub struct Scheduler {
    db: DatabaseConnection,
    registry: ServiceRegistry,
    queue: WorkerQueue,
    sched: JobScheduler,
}

impl Scheduler {
    /// Creates a new instance of [`Scheduler`]
    ///
    /// # Arguments
    /// - `db` - Database connection used to look up linked accounts
    /// - `registry` - Enabled services, only their accounts are resynced
    /// - `queue` - Worker queue the reconciliation jobs are pushed to
    pub async fn new(
        db: DatabaseConnection,
        registry: ServiceRegistry,
        queue: WorkerQueue,
    ) -> Result<Self, Error> {
        let sched = JobScheduler::new().await?;

        Ok(Self {
            db,
            registry,
            queue,
            sched,
        })
    }

    /// Registers the resync job on `cron` and starts the scheduler.
    ///
    /// # Returns
    /// - `Ok(())` - Resync registered & scheduler running
    /// - `Err(Error::SchedulerError)` - Invalid cron expression or the scheduler failed to start
    pub async fn start(&mut self, cron: &str) -> Result<(), Error> {
        let db = self.db.clone();
        let registry = self.registry.clone();
        let queue = self.queue.clone();

        let job = Job::new_async(cron, move |_, _| {
            let db = db.clone();
            let registry = registry.clone();
            let queue = queue.clone();

            Box::pin(async move {
                match enqueue_resync(&db, &registry, &queue).await {
                    Ok(count) => tracing::info!("Scheduled {} resync reconciliation(s)", count),
                    Err(e) => tracing::error!("Error scheduling resync: {}", e),
                }
            })
        })?;

        self.sched.add(job).await?;
        self.sched.start().await?;

        tracing::info!("Resync scheduled with cron expression \"{}\"", cron);

        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), Error> {
        self.sched.shutdown().await?;

        Ok(())
    }
}

/// Pushes a reconciliation job for every linked account of every enabled service.
///
/// # Returns
/// Number of jobs added; jobs already waiting in the queue are not counted.
pub async fn enqueue_resync(
    db: &DatabaseConnection,
    registry: &ServiceRegistry,
    queue: &WorkerQueue,
) -> Result<usize, Error> {
    let mut added = 0;

    for job in linked_account_jobs(db, registry).await? {
        if queue.push(job).await? {
            added += 1;
        }
    }

    Ok(added)
}
