use std::time::Duration;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::server::{
    error::{remote::RemoteError, Error},
    model::{
        service::{ReconcileOutcome, ServiceAccount, ServiceKind},
        worker::WorkerJob,
    },
    service::{
        lifecycle::LifecycleService, reconcile::ReconcileService, registry::ServiceRegistry,
        retry::RetryContext,
    },
};

/// Delay before a removal that failed on a transient error is attempted again.
pub const REMOVAL_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Handler for processing worker jobs from the queue
///
/// Each job type has a corresponding method; database connection failures are retried with
/// backoff. A failed reconciliation is picked up again by the periodic resync, a failed
/// removal has no link left for the resync to find and is rescheduled instead, see
/// [`retry_delay`].
pub struct WorkerJobHandler {
    db: DatabaseConnection,
    registry: ServiceRegistry,
}

impl WorkerJobHandler {
    /// Create a new WorkerJobHandler
    pub fn new(db: DatabaseConnection, registry: ServiceRegistry) -> Self {
        Self { db, registry }
    }

    /// Handle a worker job by delegating to the appropriate handler method
    pub async fn handle(&self, job: &WorkerJob) -> Result<(), Error> {
        match job {
            WorkerJob::ReconcileUser { user_id, service } => {
                self.reconcile_user(*user_id, *service).await.map(|_| ())
            }
            WorkerJob::RemoveAccount {
                user_id,
                service,
                uid,
                perm_key,
            } => {
                self.remove_account(*user_id, *service, uid.clone(), perm_key.clone())
                    .await
            }
        }
    }

    pub async fn reconcile_user(
        &self,
        user_id: i32,
        service: ServiceKind,
    ) -> Result<ReconcileOutcome, Error> {
        let mut ctx: RetryContext<()> = RetryContext::new();
        let description = format!("{} reconciliation of user {}", service, user_id);

        let outcome = ctx
            .execute_with_retry(&description, |_| {
                let db = self.db.clone();
                let registry = self.registry.clone();

                Box::pin(async move {
                    ReconcileService::new(&db, &registry)
                        .reconcile(user_id, service)
                        .await
                })
            })
            .await?;

        tracing::debug!("{} finished: {:?}", description, outcome);

        Ok(outcome)
    }

    /// Removes the remote account of a user that no longer exists locally
    pub async fn remove_account(
        &self,
        user_id: i32,
        service: ServiceKind,
        uid: String,
        perm_key: Option<String>,
    ) -> Result<(), Error> {
        let account = ServiceAccount {
            user_id,
            service,
            uid,
            username: None,
            perm_key,
        };

        let mut ctx: RetryContext<()> = RetryContext::new();
        let description = format!("{} account removal of user {}", service, user_id);

        ctx.execute_with_retry(&description, |_| {
            let db = self.db.clone();
            let registry = self.registry.clone();
            let account = account.clone();

            Box::pin(async move {
                LifecycleService::new(&db, &registry)
                    .remove_account(&account)
                    .await
            })
        })
        .await?;

        Ok(())
    }
}

/// Returns how long to wait before queueing a failed job again, `None` when it is dropped.
///
/// Only removals are rescheduled: once a user is deleted no link is left for the periodic
/// resync to find. A job that timed out is passed without an error.
pub fn retry_delay(job: &WorkerJob, error: Option<&Error>) -> Option<Duration> {
    if !matches!(job, WorkerJob::RemoveAccount { .. }) {
        return None;
    }

    match error {
        None => Some(REMOVAL_RETRY_DELAY),
        Some(Error::RemoteError(RemoteError::RateLimited {
            retry_after: Some(retry_after),
            ..
        })) => Some((*retry_after).max(Duration::from_secs(1))),
        Some(e) if e.is_transient() => Some(REMOVAL_RETRY_DELAY),
        Some(_) => None,
    }
}
