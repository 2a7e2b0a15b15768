//! Account lifecycle handler.
//!
//! Creates and removes the link between a user and their remote account. A link is written
//! only after the remote account exists and is deleted only after the remote side confirmed
//! the removal (an account already gone remotely counts as removed).

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::account::AccountRepository,
    error::{lifecycle::LifecycleError, Error},
    model::service::{
        ActivationRequest, RemoveOutcome, ServiceAccount, ServiceKind, ServiceStatus,
    },
    service::{affiliation::AffiliationService, registry::ServiceRegistry},
};

#[cfg(feature = "discord")]
use crate::server::client::discord::oauth::DiscordOAuth;

pub struct LifecycleService<'a> {
    db: &'a DatabaseConnection,
    registry: &'a ServiceRegistry,
}

impl<'a> LifecycleService<'a> {
    /// Creates a new instance of [`LifecycleService`]
    pub fn new(db: &'a DatabaseConnection, registry: &'a ServiceRegistry) -> Self {
        Self { db, registry }
    }

    /// Activates a user's account on a remote service
    ///
    /// # Returns
    /// - `Ok(ServiceAccount)` - The remote account was created & linked
    /// - `Err(LifecycleError::UserNotFound)` - No such user
    /// - `Err(LifecycleError::MissingPermission)` - The user lacks the service's access permission
    /// - `Err(LifecycleError::AlreadyLinked)` - The user already has an account on the service
    /// - `Err(Error)` - The remote call failed, no link was written
    pub async fn activate(
        &self,
        user_id: i32,
        request: ActivationRequest,
    ) -> Result<ServiceAccount, Error> {
        let service = request.service();
        let adapter = self.registry.get(service)?;

        let affiliation = AffiliationService::new(self.db)
            .resolve(user_id)
            .await?
            .ok_or(LifecycleError::UserNotFound(user_id))?;

        if !affiliation.has_permission(service.access_permission()) {
            return Err(LifecycleError::MissingPermission {
                user_id,
                service,
                permission: service.access_permission(),
            }
            .into());
        }

        let account_repo = AccountRepository::new(self.db);
        if account_repo.find(user_id, service).await?.is_some() {
            return Err(LifecycleError::AlreadyLinked { user_id, service }.into());
        }

        let catalog = AffiliationService::new(self.db).local_catalog().await?;
        let targets = adapter
            .resolve_desired_roles(self.db, &affiliation, &catalog)
            .await?;

        let new_account = adapter
            .create_account(&affiliation, request, &targets)
            .await?;

        let account = match service {
            ServiceKind::Discord => {
                let uid = new_account
                    .uid
                    .parse()
                    .map_err(|_| Error::ParseError(new_account.uid.clone()))?;
                account_repo
                    .create_discord(user_id, uid, new_account.username)
                    .await?
            }
            ServiceKind::Teamspeak3 => {
                let perm_key = new_account.perm_key.ok_or_else(|| {
                    Error::InternalError("TeamSpeak account created without privilege key".into())
                })?;
                account_repo
                    .create_teamspeak3(user_id, new_account.uid, perm_key)
                    .await?
            }
        };

        tracing::info!(
            "Activated {} account {} for user {}",
            service,
            account.uid,
            user_id
        );

        Ok(account)
    }

    /// Exchanges a Discord OAuth2 authorization code & activates the user's Discord account
    #[cfg(feature = "discord")]
    pub async fn activate_discord(
        &self,
        user_id: i32,
        oauth: &DiscordOAuth,
        code: String,
    ) -> Result<ServiceAccount, Error> {
        let access_token = oauth.exchange_code(code).await?;

        self.activate(user_id, ActivationRequest::Discord { access_token })
            .await
    }

    /// Deactivates a user's account on a remote service at their request
    ///
    /// # Returns
    /// - `Err(LifecycleError::NotLinked)` - The user has no account on the service
    pub async fn deactivate(&self, user_id: i32, service: ServiceKind) -> Result<(), Error> {
        let account = AccountRepository::new(self.db)
            .find(user_id, service)
            .await?
            .ok_or(LifecycleError::NotLinked { user_id, service })?;

        self.remove_account(&account).await?;

        Ok(())
    }

    /// Removes a remote account & deletes its link if it still exists
    pub async fn remove_account(&self, account: &ServiceAccount) -> Result<RemoveOutcome, Error> {
        let adapter = self.registry.get(account.service)?;

        let outcome = adapter.remove_account(account).await?;

        AccountRepository::new(self.db)
            .delete(account.user_id, account.service)
            .await?;

        tracing::info!(
            "Removed {} account {} of user {} ({:?})",
            account.service,
            account.uid,
            account.user_id,
            outcome
        );

        Ok(outcome)
    }

    /// Removes every remote account of a user, e.g. before the user is deleted
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of accounts removed
    pub async fn remove_all_accounts(&self, user_id: i32) -> Result<usize, Error> {
        let accounts = AccountRepository::new(self.db)
            .find_all_for_user(user_id)
            .await?;

        for account in &accounts {
            self.remove_account(account).await?;
        }

        Ok(accounts.len())
    }

    /// Reports the remote namespace name and the number of linked accounts of a service
    pub async fn status(&self, service: ServiceKind) -> Result<ServiceStatus, Error> {
        let adapter = self.registry.get(service)?;

        let namespace_name = adapter.namespace_name().await?;
        let linked_accounts = AccountRepository::new(self.db).count(service).await?;

        Ok(ServiceStatus {
            service,
            namespace_name,
            linked_accounts,
        })
    }
}
