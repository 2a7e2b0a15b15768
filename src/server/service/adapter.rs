//! Capability trait implemented by every remote service integration.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::server::{
    error::Error,
    model::{
        affiliation::{Affiliation, LocalRoleCatalog},
        service::{
            ActivationRequest, ApplyOutcome, MemberSnapshot, MissingMemberPolicy, NewAccount,
            RemoveOutcome, RoleDiff, RoleTargets, ServiceAccount, ServiceKind,
        },
    },
};

/// Operations the reconciliation engine & lifecycle handler need from a remote service.
///
/// Adapters never touch the account link tables; the engine owns local bookkeeping and
/// only writes after the remote call it depends on succeeded.
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    fn kind(&self) -> ServiceKind;

    /// What the engine should do when a linked member cannot be found remotely.
    fn missing_member_policy(&self) -> MissingMemberPolicy;

    /// Display name of the remote namespace (guild or virtual server).
    async fn namespace_name(&self) -> Result<String, Error>;

    /// Resolves the remote roles the user should hold, creating missing ones, and the set of
    /// remote roles Bifrost manages.
    async fn resolve_desired_roles(
        &self,
        db: &DatabaseConnection,
        affiliation: &Affiliation,
        catalog: &LocalRoleCatalog,
    ) -> Result<RoleTargets, Error>;

    /// Fetches the member's current remote roles.
    ///
    /// # Returns
    /// - `Ok(Some(MemberSnapshot))` - The member exists remotely
    /// - `Ok(None)` - The member is not present remotely
    async fn fetch_actual_roles(
        &self,
        account: &ServiceAccount,
    ) -> Result<Option<MemberSnapshot>, Error>;

    async fn apply_diff(
        &self,
        account: &ServiceAccount,
        diff: &RoleDiff,
    ) -> Result<ApplyOutcome, Error>;

    /// Creates the remote account for a user completing activation.
    async fn create_account(
        &self,
        affiliation: &Affiliation,
        request: ActivationRequest,
        targets: &RoleTargets,
    ) -> Result<NewAccount, Error>;

    /// Removes the remote account. An account already gone counts as removed.
    async fn remove_account(&self, account: &ServiceAccount) -> Result<RemoveOutcome, Error>;
}
