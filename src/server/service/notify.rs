//! Change notifications.
//!
//! Turns [`SyncEvent`]s emitted by the rest of the system into reconciliation jobs. Every event
//! fans out to one job per affected user and enabled service with a linked account; the queue
//! drops jobs whose identity is already queued.

use std::collections::BTreeSet;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{account::AccountRepository, group::GroupRepository, user::UserRepository},
    error::Error,
    model::{event::SyncEvent, worker::WorkerJob},
    service::registry::ServiceRegistry,
    worker::WorkerQueue,
};

pub struct SyncNotifier<'a> {
    db: &'a DatabaseConnection,
    registry: &'a ServiceRegistry,
    queue: &'a WorkerQueue,
}

impl<'a> SyncNotifier<'a> {
    /// Creates a new instance of [`SyncNotifier`]
    pub fn new(
        db: &'a DatabaseConnection,
        registry: &'a ServiceRegistry,
        queue: &'a WorkerQueue,
    ) -> Self {
        Self {
            db,
            registry,
            queue,
        }
    }

    /// Pushes the jobs an event requires to the worker queue
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of jobs added, duplicates of already queued jobs excluded
    pub async fn notify(&self, event: SyncEvent) -> Result<usize, Error> {
        let jobs = self.affected_jobs(&event).await?;
        let total = jobs.len();

        let mut added = 0;
        for job in jobs {
            if self.queue.push(job).await? {
                added += 1;
            }
        }

        tracing::debug!("{} queued {} job(s) ({} already queued)", event, added, total - added);

        Ok(added)
    }

    /// Computes the jobs an event requires without queueing them
    pub async fn affected_jobs(&self, event: &SyncEvent) -> Result<Vec<WorkerJob>, Error> {
        match event {
            SyncEvent::UserDeleted { user_id, accounts } => Ok(accounts
                .iter()
                .filter(|a| self.registry.is_enabled(a.service))
                .map(|a| WorkerJob::RemoveAccount {
                    user_id: *user_id,
                    service: a.service,
                    uid: a.uid.clone(),
                    perm_key: a.perm_key.clone(),
                })
                .collect()),
            SyncEvent::CharacterChanged { character_id } => {
                let user_ids = UserRepository::new(self.db)
                    .find_ids_by_main_character_id(*character_id)
                    .await?;
                self.reconcile_jobs(user_ids).await
            }
            SyncEvent::MainCharacterChanged { user_id }
            | SyncEvent::GroupMembershipChanged { user_id } => {
                self.reconcile_jobs(vec![*user_id]).await
            }
            SyncEvent::GroupPermissionsChanged { group_id } => {
                let user_ids = GroupRepository::new(self.db)
                    .get_member_ids(*group_id)
                    .await?;
                self.reconcile_jobs(user_ids).await
            }
            // State membership & permissions can affect any user
            SyncEvent::StateMembershipChanged { .. } | SyncEvent::StatePermissionsChanged { .. } => {
                self.all_linked_jobs().await
            }
        }
    }

    /// Reconciliation jobs for every linked account of the provided users
    async fn reconcile_jobs(&self, user_ids: Vec<i32>) -> Result<Vec<WorkerJob>, Error> {
        let account_repo = AccountRepository::new(self.db);
        let user_ids: BTreeSet<i32> = user_ids.into_iter().collect();

        let mut jobs = Vec::new();
        for user_id in user_ids {
            for account in account_repo.find_all_for_user(user_id).await? {
                if self.registry.is_enabled(account.service) {
                    jobs.push(WorkerJob::ReconcileUser {
                        user_id,
                        service: account.service,
                    });
                }
            }
        }

        Ok(jobs)
    }

    /// Reconciliation jobs for every linked account of every enabled service
    pub async fn all_linked_jobs(&self) -> Result<Vec<WorkerJob>, Error> {
        linked_account_jobs(self.db, self.registry).await
    }
}

/// Reconciliation jobs for every linked account of every enabled service
pub async fn linked_account_jobs(
    db: &DatabaseConnection,
    registry: &ServiceRegistry,
) -> Result<Vec<WorkerJob>, Error> {
    let account_repo = AccountRepository::new(db);

    let mut jobs = Vec::new();
    for service in registry.enabled() {
        for user_id in account_repo.get_linked_user_ids(service).await? {
            jobs.push(WorkerJob::ReconcileUser { user_id, service });
        }
    }

    Ok(jobs)
}
