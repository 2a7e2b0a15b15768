//! Diff-and-apply reconciliation engine.
//!
//! Brings one user's membership on one remote service in line with their local affiliation:
//! resolves the desired roles, fetches the member's actual roles, computes the minimal diff
//! and hands it to the service adapter. Local bookkeeping (deleting a stale or revoked link)
//! only happens after the remote side confirmed the outcome.
//!
//! Exhausted rate-limit budget anywhere in the flow turns the whole reconciliation into
//! [`ReconcileOutcome::Deferred`] with local state untouched; the periodic resync picks it
//! up again.

pub mod diff;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::account::AccountRepository,
    error::Error,
    model::service::{
        ApplyOutcome, MissingMemberPolicy, ReconcileOutcome, ServiceAccount, ServiceKind,
        UnlinkReason,
    },
    service::{
        adapter::ServiceAdapter, affiliation::AffiliationService, reconcile::diff::compute_diff,
        registry::ServiceRegistry,
    },
};

pub struct ReconcileService<'a> {
    db: &'a DatabaseConnection,
    registry: &'a ServiceRegistry,
}

impl<'a> ReconcileService<'a> {
    /// Creates a new instance of [`ReconcileService`]
    pub fn new(db: &'a DatabaseConnection, registry: &'a ServiceRegistry) -> Self {
        Self { db, registry }
    }

    /// Reconciles a user's membership on a remote service
    ///
    /// # Returns
    /// - `Ok(ReconcileOutcome::NoAccount)` - The user has no linked account on the service
    /// - `Ok(ReconcileOutcome::InSync)` - Nothing to change, no remote write was issued
    /// - `Ok(ReconcileOutcome::Updated)` - Roles and/or nickname were updated remotely
    /// - `Ok(ReconcileOutcome::Pending)` - The remote account has not been claimed yet
    /// - `Ok(ReconcileOutcome::Unlinked(_))` - The link was removed
    /// - `Ok(ReconcileOutcome::Deferred)` - Rate-limit budget exhausted, nothing was changed
    /// - `Err(Error)` - Database or remote failure, local state left as is
    pub async fn reconcile(
        &self,
        user_id: i32,
        service: ServiceKind,
    ) -> Result<ReconcileOutcome, Error> {
        let adapter = self.registry.get(service)?;

        let Some(account) = AccountRepository::new(self.db)
            .find(user_id, service)
            .await?
        else {
            return Ok(ReconcileOutcome::NoAccount);
        };

        match self.reconcile_account(adapter.as_ref(), &account).await {
            Err(e) if e.is_rate_limited() => {
                tracing::info!(
                    "Deferred {} reconciliation of user {}: {}",
                    service,
                    user_id,
                    e
                );
                Ok(ReconcileOutcome::Deferred)
            }
            result => result,
        }
    }

    async fn reconcile_account(
        &self,
        adapter: &dyn ServiceAdapter,
        account: &ServiceAccount,
    ) -> Result<ReconcileOutcome, Error> {
        let affiliation = AffiliationService::new(self.db)
            .resolve(account.user_id)
            .await?;

        let affiliation = match affiliation {
            Some(a) if a.has_permission(account.service.access_permission()) => a,
            _ => {
                adapter.remove_account(account).await?;
                self.unlink(account, UnlinkReason::AccessRevoked).await?;

                return Ok(ReconcileOutcome::Unlinked(UnlinkReason::AccessRevoked));
            }
        };

        let catalog = AffiliationService::new(self.db).local_catalog().await?;
        let targets = adapter
            .resolve_desired_roles(self.db, &affiliation, &catalog)
            .await?;

        let Some(actual) = adapter.fetch_actual_roles(account).await? else {
            return match adapter.missing_member_policy() {
                MissingMemberPolicy::Unlink => {
                    self.unlink(account, UnlinkReason::RemoteAccountGone)
                        .await?;
                    Ok(ReconcileOutcome::Unlinked(UnlinkReason::RemoteAccountGone))
                }
                MissingMemberPolicy::Defer => {
                    tracing::debug!(
                        "{} account of user {} has not been claimed yet",
                        account.service,
                        account.user_id
                    );
                    Ok(ReconcileOutcome::Pending)
                }
            };
        };

        let diff = compute_diff(&targets, &actual);
        if diff.is_empty() {
            tracing::debug!(
                "{} account of user {} is in sync",
                account.service,
                account.user_id
            );
            return Ok(ReconcileOutcome::InSync);
        }

        match adapter.apply_diff(account, &diff).await? {
            ApplyOutcome::Applied => {
                tracing::info!(
                    "Updated {} account of user {} (+{:?} -{:?}{})",
                    account.service,
                    account.user_id,
                    diff.add,
                    diff.remove,
                    diff.nickname
                        .as_deref()
                        .map(|n| format!(", nickname \"{}\"", n))
                        .unwrap_or_default()
                );
                Ok(ReconcileOutcome::Updated)
            }
            ApplyOutcome::MemberGone => {
                self.unlink(account, UnlinkReason::RemoteAccountGone)
                    .await?;
                Ok(ReconcileOutcome::Unlinked(UnlinkReason::RemoteAccountGone))
            }
        }
    }

    async fn unlink(&self, account: &ServiceAccount, reason: UnlinkReason) -> Result<(), Error> {
        AccountRepository::new(self.db)
            .delete(account.user_id, account.service)
            .await?;

        match reason {
            UnlinkReason::AccessRevoked => tracing::info!(
                "Removed {} account of user {}: access permission lost",
                account.service,
                account.user_id
            ),
            UnlinkReason::RemoteAccountGone => tracing::warn!(
                "Removed stale {} link of user {}: remote account no longer exists",
                account.service,
                account.user_id
            ),
        }

        Ok(())
    }
}
